// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis report export.
//!
//! Reports are written as YAML or JSON depending on the chosen extension.

use crate::models::report::AnalysisReport;
use anyhow::{bail, Result};
use std::path::Path;

/// Export a report in the format implied by the file extension.
pub fn export_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(report, path),
        Some("json") => export_json(report, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Export a report to YAML format.
pub fn export_yaml(report: &AnalysisReport, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(report)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a report to JSON format.
pub fn export_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
