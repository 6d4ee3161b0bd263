// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy for the analysis pipeline.
//!
//! Every failure is tagged where it happens. The UI only ever looks at
//! [`AnalysisError::kind`] and [`AnalysisError::user_message`].

use thiserror::Error;

/// User-distinguishable failure buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The selected image could not be read or captured.
    Input,
    /// The service could not be reached or answered with a non-2xx status.
    Network,
    /// The service answered with an explicit error envelope.
    Service,
    /// The reply did not contain a usable verdict.
    MalformedOutput,
}

/// Failure of a single analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not read image: {0}")]
    Input(String),

    #[error("No API key configured. Set GEMINI_API_KEY or inference.api_key in the config file")]
    MissingApiKey,

    #[error("Request could not be sent: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request failed: {status} {reason}")]
    HttpStatus {
        status: u16,
        reason: String,
        detail: Option<String>,
    },

    #[error("{0}")]
    Service(String),

    #[error("Unreadable reply from inference service: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("No analysis result received from the model")]
    MissingText,

    #[error("Could not find JSON in response")]
    NoJson,

    #[error("Could not parse analysis result: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid response format - missing required field `{field}`")]
    InvalidShape { field: &'static str },
}

impl AnalysisError {
    /// Bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Input(_) => ErrorKind::Input,
            AnalysisError::Transport(_) | AnalysisError::HttpStatus { .. } => ErrorKind::Network,
            AnalysisError::MissingApiKey | AnalysisError::Service(_) => ErrorKind::Service,
            AnalysisError::Envelope(_)
            | AnalysisError::MissingText
            | AnalysisError::NoJson
            | AnalysisError::Parse(_)
            | AnalysisError::InvalidShape { .. } => ErrorKind::MalformedOutput,
        }
    }

    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => format!(
                "Network error. Please check your internet connection and try again. ({})",
                self.network_detail()
            ),
            ErrorKind::Service => {
                format!("API service error: {}. Please try again in a moment.", self)
            }
            ErrorKind::Input | ErrorKind::MalformedOutput => self.to_string(),
        }
    }

    fn network_detail(&self) -> String {
        match self {
            AnalysisError::HttpStatus {
                detail: Some(detail),
                ..
            } => format!("{}: {}", self, detail),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failures_are_network_flavored() {
        let err = AnalysisError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
            detail: None,
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        let message = err.user_message();
        assert!(message.starts_with("Network error."));
        assert!(message.contains("503 Service Unavailable"));
    }

    #[test]
    fn test_status_detail_is_appended() {
        let err = AnalysisError::HttpStatus {
            status: 400,
            reason: "Bad Request".to_string(),
            detail: Some("API key not valid".to_string()),
        };
        assert!(err.user_message().contains("API key not valid"));
    }

    #[test]
    fn test_service_message_carries_service_text() {
        let err = AnalysisError::Service("quota exceeded".to_string());
        assert_eq!(err.kind(), ErrorKind::Service);
        let message = err.user_message();
        assert!(message.starts_with("API service error"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn test_malformed_messages_are_distinct() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let messages = [
            AnalysisError::MissingText.user_message(),
            AnalysisError::NoJson.user_message(),
            AnalysisError::Parse(parse_err).user_message(),
            AnalysisError::InvalidShape { field: "confidence" }.user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(messages[3].contains("confidence"));
    }

    #[test]
    fn test_input_errors_are_shown_verbatim() {
        let err = AnalysisError::Input("permission denied".to_string());
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.user_message(), "Could not read image: permission denied");
    }
}
