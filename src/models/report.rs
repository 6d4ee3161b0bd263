// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exportable analysis report.

use super::verdict::RipenessVerdict;
use serde::{Deserialize, Serialize};

/// A verdict together with the image it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub image_file: String,
    pub model: String,
    pub verdict: RipenessVerdict,
}

impl AnalysisReport {
    pub fn new(image_file: String, model: String, verdict: RipenessVerdict) -> Self {
        Self {
            image_file,
            model,
            verdict,
        }
    }
}
