// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine backed by `ocrs`, a pure-Rust OCR engine running neural network
// models through `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// lesewerk-document = { path = "crates/lesewerk-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions in the image.
// - **Recognition model** (`text-recognition.rten`) — decodes characters from detected regions.
//
// Running the `ocrs` CLI once downloads both into `~/.cache/ocrs/`:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png
//   ```
//
// The default cache directory is `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use lesewerk_core::error::LesewerkError;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use super::{OcrBackend, RecognitionSession};
use crate::raster::PageImage;

/// Languages the bundled models can read. `ocrs` models cover Latin script.
pub const SUPPORTED_LANGUAGES: &[&str] = &["eng"];

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`, falling
/// back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Where to find the model files.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path to the text-detection model file (`.rten`).
    pub detection_model_path: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Use `dir` when configured, otherwise the default cache directory.
    pub fn from_optional_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::default(),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<(), LesewerkError> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(LesewerkError::OcrError(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Whether both model files are present.
    pub fn models_available(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Loaded `ocrs` engine.
///
/// Model loading is the expensive step; one engine serves every page of a run.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Load the detection and recognition models named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LesewerkError::OcrError`] if model files are missing or corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self, LesewerkError> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = load_model(&config.detection_model_path)?;
        info!("Loading OCR recognition model");
        let recognition_model = load_model(&config.recognition_model_path)?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            LesewerkError::OcrError(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Extract all text from a page image, lines separated by newlines.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String, LesewerkError> {
        // ocrs expects RGB8.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source =
            ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
                LesewerkError::OcrError(format!(
                    "failed to create image source ({}x{}): {}",
                    width, height, err
                ))
            })?;

        let input = self.engine.prepare_input(source).map_err(|err| {
            LesewerkError::OcrError(format!("OCR preprocessing failed: {}", err))
        })?;

        let text = self.engine.get_text(&input).map_err(|err| {
            LesewerkError::OcrError(format!("OCR text recognition failed: {}", err))
        })?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

fn load_model(path: &Path) -> Result<Model, LesewerkError> {
    Model::load_file(path).map_err(|err| {
        LesewerkError::OcrError(format!(
            "failed to load model from {}: {}",
            path.display(),
            err
        ))
    })
}

/// [`OcrBackend`] that loads a fresh `ocrs` engine for every run.
#[derive(Debug, Clone)]
pub struct OcrsBackend {
    config: OcrConfig,
}

impl OcrsBackend {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl OcrBackend for OcrsBackend {
    async fn start(&self, language: &str) -> Result<Box<dyn RecognitionSession>, LesewerkError> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return Err(LesewerkError::UnsupportedLanguage(language.to_string()));
        }
        let config = self.config.clone();
        let engine = tokio::task::spawn_blocking(move || OcrEngine::new(&config))
            .await
            .map_err(|err| LesewerkError::OcrError(format!("model loading worker failed: {}", err)))??;
        Ok(Box::new(OcrsSession {
            engine: Arc::new(engine),
            pages: 0,
        }))
    }
}

/// One run's engine handle.
struct OcrsSession {
    engine: Arc<OcrEngine>,
    pages: usize,
}

#[async_trait]
impl RecognitionSession for OcrsSession {
    async fn recognize(&mut self, page: &PageImage) -> Result<String, LesewerkError> {
        let engine = Arc::clone(&self.engine);
        let pixels = page.shared_pixels();
        let text = tokio::task::spawn_blocking(move || engine.recognize_text(&pixels))
            .await
            .map_err(|err| LesewerkError::OcrError(format!("recognition worker failed: {}", err)))??;
        self.pages += 1;
        Ok(text)
    }

    async fn shutdown(self: Box<Self>) {
        info!(pages = self.pages, "OCR engine shut down");
    }
}
