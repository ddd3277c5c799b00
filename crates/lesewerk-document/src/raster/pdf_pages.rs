// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginated documents: page count from metadata, pages rendered on demand.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lesewerk_core::error::{LesewerkError, Result};
use tracing::{debug, instrument};

use super::{PageImage, PageSource, worker_failed};
use crate::pdf::reader::PdfReader;
use crate::pdf::render::PdfRenderWorker;

/// Lazy page source over an in-memory PDF.
pub struct PdfPages {
    page_count: usize,
    next_index: usize,
    worker: PdfRenderWorker,
    jpeg_quality: u8,
}

impl PdfPages {
    /// Read the page count and start the renderer. Pages are rendered only
    /// on `render_next`.
    ///
    /// A renderer that cannot start fails the whole document here.
    pub async fn open(
        bytes: Vec<u8>,
        render_width: u32,
        jpeg_quality: u8,
        pdfium_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let metadata_bytes = Arc::clone(&bytes);
        let page_count = tokio::task::spawn_blocking(move || {
            PdfReader::from_bytes(&metadata_bytes).map(|reader| reader.page_count())
        })
        .await
        .map_err(|err| LesewerkError::PdfError(format!("PDF worker failed: {}", err)))??;

        if page_count == 0 {
            return Err(LesewerkError::PdfError("document has no pages".into()));
        }

        let worker = PdfRenderWorker::start(bytes, render_width, pdfium_dir).await?;
        Ok(Self {
            page_count,
            next_index: 0,
            worker,
            jpeg_quality,
        })
    }
}

#[async_trait]
impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    #[instrument(skip(self), fields(page = self.next_index + 1, of = self.page_count))]
    async fn render_next(&mut self) -> Option<Result<PageImage>> {
        if self.next_index >= self.page_count {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        let pixels = match self.worker.render(index).await {
            Ok(pixels) => pixels,
            Err(err) => return Some(Err(err)),
        };
        let quality = self.jpeg_quality;
        let rendered =
            tokio::task::spawn_blocking(move || PageImage::from_pixels(index + 1, pixels, quality))
                .await
                .map_err(worker_failed)
                .and_then(|result| result);

        if let Ok(ref page) = rendered {
            debug!(width = page.width(), height = page.height(), "PDF page ready");
        }
        Some(rendered)
    }
}
