// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image acquisition.
//!
//! This module checks a file's declared type, reads its bytes, decodes a
//! preview for display and builds the inline payload for analysis.

use crate::models::image::EncodedImage;
use anyhow::{Context, Result};
use image::ImageFormat;
use std::path::Path;

/// Longest preview edge in pixels.
const PREVIEW_MAX_EDGE: u32 = 1024;

/// A read and encoded image, ready for preview and analysis.
#[derive(Debug)]
pub struct LoadedImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// RGBA preview pixels
    pub pixels: Vec<u8>,
    pub encoded: EncodedImage,
}

/// Content type implied by a file's extension.
pub fn declared_mime(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Only `image/*` content is accepted.
pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Content type to submit `path` with, or `None` when it must be ignored.
///
/// A non-empty `declared` type wins over the one implied by the extension.
pub fn accepted_mime(path: &Path, declared: Option<&str>) -> Option<String> {
    declared
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| declared_mime(path))
        .filter(|m| is_image_mime(m))
}

/// Read and encode an image file.
pub fn load_image(path: &Path, declared_mime: &str) -> Result<LoadedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("{}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    load_image_bytes(&bytes, declared_mime, file_name)
}

/// Decode a preview and encode the payload from in-memory bytes.
pub fn load_image_bytes(bytes: &[u8], declared_mime: &str, file_name: String) -> Result<LoadedImage> {
    let decoded = image::load_from_memory(bytes)
        .with_context(|| format!("{} is not a readable image", file_name))?;
    let encoded = EncodedImage::new(declared_mime, bytes, &decoded)
        .with_context(|| format!("Failed to encode {}", file_name))?;

    let preview = if decoded.width() > PREVIEW_MAX_EDGE || decoded.height() > PREVIEW_MAX_EDGE {
        decoded.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE)
    } else {
        decoded
    };
    let rgba = preview.to_rgba8();

    log::info!(
        "Loaded image: {} ({}x{}, sent as {})",
        file_name,
        rgba.width(),
        rgba.height(),
        encoded.mime_type()
    );

    Ok(LoadedImage {
        file_name,
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
        encoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::path::PathBuf;

    #[test]
    fn test_declared_mime_from_extension() {
        assert_eq!(declared_mime(&PathBuf::from("a.png")).as_deref(), Some("image/png"));
        assert_eq!(declared_mime(&PathBuf::from("a.JPG")).as_deref(), Some("image/jpeg"));
        assert_eq!(declared_mime(&PathBuf::from("notes.txt")), None);
        assert_eq!(declared_mime(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_image_prefix_check() {
        assert!(is_image_mime("image/webp"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime("application/image"));
    }

    #[test]
    fn test_non_images_are_not_accepted() {
        let path = PathBuf::from("photo.png");
        assert_eq!(accepted_mime(&path, None).as_deref(), Some("image/png"));
        assert_eq!(accepted_mime(&path, Some("")).as_deref(), Some("image/png"));
        assert_eq!(accepted_mime(&path, Some("text/plain")), None);
        assert_eq!(accepted_mime(&PathBuf::from("report.pdf"), None), None);
        assert_eq!(
            accepted_mime(&PathBuf::from("blob"), Some("image/heic")).as_deref(),
            Some("image/heic")
        );
    }

    #[test]
    fn test_load_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banana.png");
        DynamicImage::ImageRgb8(RgbImage::new(8, 4)).save(&path).unwrap();

        let loaded = load_image(&path, "image/png").unwrap();
        assert_eq!(loaded.file_name, "banana.png");
        assert_eq!((loaded.width, loaded.height), (8, 4));
        assert_eq!(loaded.pixels.len(), 8 * 4 * 4);
        assert_eq!(loaded.encoded.mime_type(), "image/png");
    }

    #[test]
    fn test_large_images_get_small_preview() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(2048, 512))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();

        let loaded = load_image_bytes(bytes.get_ref(), "image/png", "wide.png".to_string()).unwrap();
        assert_eq!(loaded.width, PREVIEW_MAX_EDGE);
        assert_eq!(loaded.height, 256);
    }

    #[test]
    fn test_unreadable_bytes_fail() {
        assert!(load_image_bytes(b"nope", "image/png", "bad.png".to_string()).is_err());
    }

    #[test]
    fn test_undecodable_image_type_fails() {
        let heic = b"\0\0\0\x18ftypheic\0\0\0\0mif1heic";
        let err = load_image_bytes(heic, "image/heic", "photo.heic".to_string()).unwrap_err();
        assert!(format!("{:#}", err).contains("photo.heic is not a readable image"));
    }
}
