// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};

/// Width in pixels every rendered PDF page is scaled to.
pub const DEFAULT_RENDER_WIDTH: u32 = 1000;

/// Largest accepted render width. Pdfium takes the width as an `i32`.
pub const MAX_RENDER_WIDTH: u32 = 16_384;

/// Recognition language handed to the OCR engine.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Application settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target width of rendered PDF pages; height follows the page aspect ratio.
    pub render_width: u32,
    /// Language code passed to the OCR engine when a run starts.
    pub ocr_language: String,
    /// JPEG quality (1–100) used when encoding rendered pages for display.
    pub jpeg_quality: u8,
    /// Directory holding the OCR model files. `None` uses the engine's cache dir.
    pub model_dir: Option<PathBuf>,
    /// Directory holding the Pdfium shared library. `None` looks next to the
    /// executable, then falls back to the system library.
    pub pdfium_dir: Option<PathBuf>,
    /// Drop zone text shown while no document is being processed.
    pub idle_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            jpeg_quality: 80,
            model_dir: None,
            pdfium_dir: None,
            idle_prompt: "Drop an image or PDF here, click to choose a file, or paste an image"
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Reject values the rasterizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.render_width == 0 {
            return Err(LesewerkError::Config(
                "render_width must be greater than zero".into(),
            ));
        }
        if self.render_width > MAX_RENDER_WIDTH {
            return Err(LesewerkError::Config(format!(
                "render_width must be at most {}, got {}",
                MAX_RENDER_WIDTH, self.render_width
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(LesewerkError::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.ocr_language.trim().is_empty() {
            return Err(LesewerkError::Config("ocr_language must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.render_width, 1000);
        assert_eq!(config.ocr_language, "eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "render_width": 1200 }"#).expect("parse partial config");
        assert_eq!(config.render_width, 1200);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.ocr_language, DEFAULT_OCR_LANGUAGE);
    }

    #[test]
    fn zero_width_is_rejected() {
        let config = AppConfig {
            render_width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LesewerkError::Config(_))));
    }

    #[test]
    fn oversized_width_is_rejected() {
        let config = AppConfig {
            render_width: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LesewerkError::Config(_))));

        let largest = AppConfig {
            render_width: MAX_RENDER_WIDTH,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let config = AppConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
