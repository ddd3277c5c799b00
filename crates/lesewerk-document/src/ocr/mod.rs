// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR adapter — engine lifecycle and per-page recognition.
//
// A backend hands out one `RecognitionSession` per run. The session is used
// for every page of that run and shut down exactly once when the run ends.
// `recognize` takes `&mut self`, so two recognitions can never overlap on the
// same session.

#[cfg(feature = "ocr")]
pub mod engine;

use async_trait::async_trait;
use lesewerk_core::error::Result;

use crate::raster::PageImage;

/// Factory for recognition sessions (the "engine handle").
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Start an engine for `language`. This is the expensive step.
    async fn start(&self, language: &str) -> Result<Box<dyn RecognitionSession>>;
}

/// A started OCR engine, owned by exactly one run.
#[async_trait]
pub trait RecognitionSession: Send {
    /// Recognise the text on one page.
    async fn recognize(&mut self, page: &PageImage) -> Result<String>;

    /// Release the engine. Consumes the session.
    async fn shutdown(self: Box<Self>);
}
