// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ripeness analysis pipeline.
//!
//! Builds the request, sends it through an [`InferenceBackend`], then
//! reads the envelope, extracts the embedded JSON and validates it.

pub mod extract;
pub mod gemini;

use crate::error::AnalysisError;
use crate::models::{image::EncodedImage, verdict::RipenessVerdict};
use gemini::{GenerateContentRequest, GenerateContentResponse, InferenceBackend};

/// Instruction sent alongside every image.
pub const RIPENESS_PROMPT: &str = r#"Analyze this banana image and determine its ripeness level. Respond with a single JSON object in exactly this format:
{
  "ripeness": "one of: green/unripe, yellow/perfect, spotted/very ripe, brown/overripe",
  "confidence": "confidence percentage as a number from 0 to 100",
  "description": "detailed description of the banana's appearance and ripeness indicators"
}"#;

/// Run one analysis against `backend`.
pub fn analyze(
    backend: &dyn InferenceBackend,
    image: &EncodedImage,
    structured_output: bool,
) -> Result<RipenessVerdict, AnalysisError> {
    let request = GenerateContentRequest::for_image(RIPENESS_PROMPT, image, structured_output);
    let body = backend.generate(&request)?;
    verdict_from_body(&body)
}

/// Interpret a 2xx response body.
pub fn verdict_from_body(body: &str) -> Result<RipenessVerdict, AnalysisError> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(AnalysisError::Envelope)?;

    if let Some(text) = envelope.first_text() {
        log::debug!("Model response: {}", text);
        return extract::verdict_from_text(text);
    }

    if let Some(error) = envelope.error {
        let message = error
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown API error".to_string());
        return Err(AnalysisError::Service(message));
    }

    log::error!("Unexpected API response structure: {}", body);
    Err(AnalysisError::MissingText)
}
