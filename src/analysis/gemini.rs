// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gemini `generateContent` wire types and HTTP client.

use crate::config::InferenceConfig;
use crate::error::AnalysisError;
use crate::models::image::EncodedImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A text instruction or an inline image.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

impl GenerateContentRequest {
    /// One instruction part followed by one inline image part.
    pub fn for_image(prompt: &str, image: &EncodedImage, structured_output: bool) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.payload().to_string(),
                        },
                    },
                ],
            }],
            generation_config: structured_output.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        }
    }
}

/// Response envelope. Every field is optional so partial replies still parse.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, when it is non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

/// Anything that can answer a `generateContent` request with a 2xx body.
pub trait InferenceBackend: Send + Sync {
    fn generate(&self, request: &GenerateContentRequest) -> Result<String, AnalysisError>;

    /// Model name recorded in exported reports.
    fn model(&self) -> &str;
}

/// Blocking HTTP client for the public Gemini API.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(AnalysisError::Transport)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl InferenceBackend for GeminiClient {
    fn generate(&self, request: &GenerateContentRequest) -> Result<String, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        log::info!("Sending image to {}", self.model);
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .map_err(AnalysisError::Transport)?;

        let status = response.status();
        let body = response.text().map_err(AnalysisError::Transport)?;
        ensure_success(status.as_u16(), status.canonical_reason(), &body)?;
        Ok(body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Turn a non-2xx status into a transport failure.
pub fn ensure_success(status: u16, reason: Option<&str>, body: &str) -> Result<(), AnalysisError> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let detail = serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message);

    Err(AnalysisError::HttpStatus {
        status,
        reason: reason.unwrap_or("Unknown").to_string(),
        detail,
    })
}
