// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer adapter — turns a submitted document into a lazy, pull-based
// sequence of page images.
//
// Images pass through untouched as a single page. PDFs report their page
// count up front and render one page per `next_page` call, so at most one
// rendered page is alive ahead of the consumer.

mod image_pages;
#[cfg(feature = "pdf")]
mod pdf_pages;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{AppConfig, Document, MediaKind};
use tracing::{info, instrument, warn};

use crate::image::processor::ImageProcessor;

pub use image_pages::ImagePages;
#[cfg(feature = "pdf")]
pub use pdf_pages::PdfPages;

/// One rendered page: decoded pixels for recognition plus encoded bytes for
/// display. Cloning is cheap; both buffers are shared.
#[derive(Clone)]
pub struct PageImage {
    number: usize,
    pixels: Arc<DynamicImage>,
    encoded: Arc<[u8]>,
    mime: String,
}

impl PageImage {
    /// Wrap already-encoded bytes alongside their decoded pixels.
    pub fn new(
        number: usize,
        pixels: DynamicImage,
        encoded: impl Into<Arc<[u8]>>,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            number,
            pixels: Arc::new(pixels),
            encoded: encoded.into(),
            mime: mime.into(),
        }
    }

    /// Build a page from freshly rendered pixels, JPEG-encoding them for display.
    pub fn from_pixels(number: usize, pixels: DynamicImage, jpeg_quality: u8) -> Result<Self> {
        let processor = ImageProcessor::from_dynamic(pixels);
        let encoded = processor.to_jpeg_bytes(jpeg_quality)?;
        Ok(Self::new(number, processor.into_dynamic(), encoded, "image/jpeg"))
    }

    /// 1-based page number within the source document.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Shared handle to the pixels, for moving onto a worker thread.
    pub fn shared_pixels(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.pixels)
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `data:` URL of the encoded bytes, suitable for an `<img src>`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.encoded))
    }
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("number", &self.number)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("mime", &self.mime)
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}

/// Pull-based, single-pass sequence of pages for one document.
#[async_trait]
pub trait PageSource: Send {
    /// Total number of pages in the document (at least 1).
    fn page_count(&self) -> usize;

    /// Produce the next page, or `None` once every page has been attempted.
    ///
    /// A page that fails to render yields `Some(Err(..))`; the sequence
    /// continues with the following page on the next call.
    async fn render_next(&mut self) -> Option<Result<PageImage>>;

    /// Next successfully rendered page. Failed pages are logged and skipped.
    async fn next_page(&mut self) -> Option<PageImage> {
        loop {
            match self.render_next().await? {
                Ok(page) => return Some(page),
                Err(err) => warn!(error = %err, "Skipping page that failed to render"),
            }
        }
    }
}

/// Opens documents into page sequences.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Open `document`. Failure here means the document cannot be read at all.
    async fn open(&self, document: Document) -> Result<Box<dyn PageSource>>;
}

/// The production rasterizer: images pass through, PDFs render via Pdfium.
#[derive(Debug, Clone)]
pub struct DocumentRasterizer {
    render_width: u32,
    jpeg_quality: u8,
    pdfium_dir: Option<PathBuf>,
}

impl DocumentRasterizer {
    pub fn new(render_width: u32, jpeg_quality: u8) -> Self {
        Self {
            render_width,
            jpeg_quality,
            pdfium_dir: None,
        }
    }

    /// Load Pdfium from `dir` only, instead of the default search.
    pub fn with_pdfium_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pdfium_dir = Some(dir.into());
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pdfium_dir: config.pdfium_dir.clone(),
            ..Self::new(config.render_width, config.jpeg_quality)
        }
    }
}

#[async_trait]
impl Rasterizer for DocumentRasterizer {
    #[instrument(skip_all, fields(name = %document.name, mime = %document.mime))]
    async fn open(&self, document: Document) -> Result<Box<dyn PageSource>> {
        match document.media_kind() {
            Some(MediaKind::Image) => {
                info!("Opening image document");
                Ok(Box::new(ImagePages::open(document).await?))
            }
            Some(MediaKind::Paginated) => self.open_paginated(document).await,
            None => Err(LesewerkError::UnsupportedDocument(document.mime)),
        }
    }
}

impl DocumentRasterizer {
    #[cfg(feature = "pdf")]
    async fn open_paginated(&self, document: Document) -> Result<Box<dyn PageSource>> {
        let pages = PdfPages::open(
            document.bytes,
            self.render_width,
            self.jpeg_quality,
            self.pdfium_dir.clone(),
        )
        .await?;
        info!(page_count = pages.page_count(), "Opened PDF document");
        Ok(Box::new(pages))
    }

    #[cfg(not(feature = "pdf"))]
    async fn open_paginated(&self, document: Document) -> Result<Box<dyn PageSource>> {
        let _ = (self.render_width, self.jpeg_quality, &self.pdfium_dir);
        Err(LesewerkError::UnsupportedDocument(format!(
            "{} (built without PDF support)",
            document.mime
        )))
    }
}

/// Map a panicked or cancelled blocking task into a domain error.
pub(crate) fn worker_failed(err: tokio::task::JoinError) -> LesewerkError {
    LesewerkError::ImageError(format!("rendering worker failed: {}", err))
}
