// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the aspect-preserving fit used to place the
//! image preview inside its panel.

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_within(width: u32, height: u32, available: (f32, f32)) -> (f32, f32) {
    if width == 0 || height == 0 || available.0 <= 0.0 || available.1 <= 0.0 {
        return (0.0, 0.0);
    }

    let img_aspect = width as f32 / height as f32;
    let available_aspect = available.0 / available.1;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.0, available.0 / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.1 * img_aspect, available.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_fits_width() {
        let (w, h) = fit_within(1920, 1080, (400.0, 400.0));
        assert!((w - 400.0).abs() < 0.0001);
        assert!((h - 225.0).abs() < 0.0001);
    }

    #[test]
    fn test_tall_image_fits_height() {
        let (w, h) = fit_within(1000, 2000, (400.0, 400.0));
        assert!((w - 200.0).abs() < 0.0001);
        assert!((h - 400.0).abs() < 0.0001);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(fit_within(0, 10, (100.0, 100.0)), (0.0, 0.0));
        assert_eq!(fit_within(10, 10, (0.0, 100.0)), (0.0, 0.0));
    }
}
