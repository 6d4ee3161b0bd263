// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Inline image payloads sent to the inference service.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, ImageResult};
use std::io::Cursor;

/// MIME types accepted by the inference request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
        }
    }
}

/// An image encoded as base64 text together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: ImageMime,
    payload: String,
}

impl EncodedImage {
    /// Encode source bytes for an inline request part.
    ///
    /// PNG and JPEG sources are passed through untouched. Anything else is
    /// re-encoded as JPEG from `decoded` so the payload always matches the
    /// MIME type.
    pub fn new(declared_mime: &str, bytes: &[u8], decoded: &DynamicImage) -> ImageResult<Self> {
        let declared = declared_mime.to_ascii_lowercase();
        if declared == "image/png" {
            return Ok(Self::from_raw(ImageMime::Png, bytes));
        }
        if declared == "image/jpeg" || declared == "image/jpg" {
            return Ok(Self::from_raw(ImageMime::Jpeg, bytes));
        }

        log::debug!("Transcoding {} source to JPEG", declared_mime);
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(decoded.to_rgb8()).write_to(&mut jpeg, ImageFormat::Jpeg)?;
        Ok(Self::from_raw(ImageMime::Jpeg, jpeg.get_ref()))
    }

    fn from_raw(mime: ImageMime, bytes: &[u8]) -> Self {
        Self {
            mime,
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime.as_str()
    }

    /// Base64 text of the image bytes.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}
