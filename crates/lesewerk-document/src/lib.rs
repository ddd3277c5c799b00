// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-document — Turning submitted documents into pages and pages into text.
//
// Provides the rasterizer adapter (images pass through untouched, PDFs are
// rendered lazily one page at a time at a fixed width), the OCR adapter
// (one engine handle per run, sequential recognition), and the image helpers
// both of them share.

pub mod image;
pub mod ocr;
pub mod pdf;
pub mod raster;

// Re-export the primary types so callers can use `lesewerk_document::PageImage` etc.
pub use crate::image::processor::ImageProcessor;
pub use ocr::{OcrBackend, RecognitionSession};
pub use pdf::reader::PdfReader;
pub use raster::{DocumentRasterizer, PageImage, PageSource, Rasterizer};

#[cfg(feature = "ocr")]
pub use ocr::engine::{OcrEngine, OcrsBackend};
