// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ripeness verdict data structures.
//!
//! A verdict is only built from a JSON object that carries all three
//! required fields with truthy values.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ripeness judgment extracted from the model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RipenessVerdict {
    pub ripeness: String,
    pub confidence: f64,
    pub description: String,
}

/// Ripeness stage recognised from the free-form `ripeness` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RipenessLevel {
    Unripe,
    Perfect,
    VeryRipe,
    Overripe,
}

impl RipenessLevel {
    /// Classify by keyword containment, checked in ripening order.
    pub fn classify(ripeness: &str) -> Option<Self> {
        let text = ripeness.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["green", "unripe"]) {
            Some(RipenessLevel::Unripe)
        } else if has(&["yellow", "perfect"]) {
            Some(RipenessLevel::Perfect)
        } else if has(&["spotted", "very ripe"]) {
            Some(RipenessLevel::VeryRipe)
        } else if has(&["brown", "overripe"]) {
            Some(RipenessLevel::Overripe)
        } else {
            None
        }
    }
}

impl RipenessVerdict {
    /// Validate a parsed JSON value and build a verdict from it.
    pub fn from_value(value: &Value) -> Result<Self, AnalysisError> {
        let ripeness = required(value, "ripeness")?;
        let confidence = required(value, "confidence")?;
        let description = required(value, "description")?;

        Ok(Self {
            ripeness: text_of(ripeness),
            confidence: confidence_of(confidence)?,
            description: text_of(description),
        })
    }

    pub fn level(&self) -> Option<RipenessLevel> {
        RipenessLevel::classify(&self.ripeness)
    }
}

fn required<'a>(value: &'a Value, field: &'static str) -> Result<&'a Value, AnalysisError> {
    value
        .get(field)
        .filter(|v| is_truthy(v))
        .ok_or(AnalysisError::InvalidShape { field })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts a number or a numeric string such as `"92"` or `"92%"`.
fn confidence_of(value: &Value) -> Result<f64, AnalysisError> {
    let confidence = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    confidence
        .filter(|c| (0.0..=100.0).contains(c))
        .ok_or(AnalysisError::InvalidShape {
            field: "confidence",
        })
}
