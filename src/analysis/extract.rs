// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Verdict extraction from free-form model text.
//!
//! The model is asked for a JSON object but may wrap it in prose or code
//! fences. The scanner tracks brace depth and string literals so nested
//! objects and braces inside descriptions do not end the object early.

use crate::error::AnalysisError;
use crate::models::verdict::RipenessVerdict;

/// Locate the first balanced `{ ... }` object in `text`.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Find, parse and validate the verdict embedded in `text`.
pub fn verdict_from_text(text: &str) -> Result<RipenessVerdict, AnalysisError> {
    let object = find_json_object(text).ok_or(AnalysisError::NoJson)?;
    let value: serde_json::Value = serde_json::from_str(object).map_err(AnalysisError::Parse)?;
    RipenessVerdict::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let text = r#"{"ripeness":"yellow/perfect","confidence":92,"description":"firm"}"#;
        assert_eq!(find_json_object(text), Some(text));
    }

    #[test]
    fn test_object_inside_prose_and_fences() {
        let text = "Here you go:\n```json\n{\"ripeness\": \"green\"}\n```\nEnjoy!";
        assert_eq!(find_json_object(text), Some("{\"ripeness\": \"green\"}"));
    }

    #[test]
    fn test_nested_objects_are_skipped() {
        let text = r#"{"a": {"b": 1}, "c": 2} trailing {"d": 3}"#;
        assert_eq!(find_json_object(text), Some(r#"{"a": {"b": 1}, "c": 2}"#));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"{"description": "looks like a } smile {", "x": "\"}"}"#;
        assert_eq!(find_json_object(text), Some(text));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(find_json_object("The banana looks ripe."), None);
        assert_eq!(find_json_object("} backwards {"), None);
        assert_eq!(find_json_object("{\"unterminated\": 1"), None);
    }

    #[test]
    fn test_no_json_is_distinct_from_parse_failure() {
        let err = verdict_from_text("Sorry, I cannot see a banana.").unwrap_err();
        assert!(matches!(err, AnalysisError::NoJson));

        let err = verdict_from_text(r#"{"ripeness": }"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_description_with_braces_still_parses() {
        let text = r#"Result: {"ripeness":"spotted/very ripe","confidence":80,"description":"spots {many} here"}"#;
        let verdict = verdict_from_text(text).unwrap();
        assert_eq!(verdict.description, "spots {many} here");
    }

    #[test]
    fn test_missing_field_is_invalid_shape() {
        let err = verdict_from_text(r#"{"ripeness":"yellow","description":"ok"}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidShape { field: "confidence" }));
    }
}
