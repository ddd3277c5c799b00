// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-image documents: one page, the original bytes untouched.

use async_trait::async_trait;
use lesewerk_core::Document;
use lesewerk_core::error::Result;
use tracing::debug;

use super::{PageImage, PageSource, worker_failed};
use crate::image::processor::ImageProcessor;

/// Page source for a plain image. Yields exactly one page.
#[derive(Debug)]
pub struct ImagePages {
    page: Option<PageImage>,
}

impl ImagePages {
    /// Decode the image once so recognition has pixels to work with.
    ///
    /// A decode failure means the document cannot be opened at all.
    pub async fn open(document: Document) -> Result<Self> {
        let Document { mime, bytes, .. } = document;
        let page = tokio::task::spawn_blocking(move || {
            let pixels = ImageProcessor::from_bytes(&bytes)?.into_dynamic();
            Ok::<_, lesewerk_core::LesewerkError>(PageImage::new(1, pixels, bytes, mime))
        })
        .await
        .map_err(worker_failed)??;

        debug!(width = page.width(), height = page.height(), "Image page ready");
        Ok(Self { page: Some(page) })
    }
}

#[async_trait]
impl PageSource for ImagePages {
    fn page_count(&self) -> usize {
        1
    }

    async fn render_next(&mut self) -> Option<Result<PageImage>> {
        self.page.take().map(Ok)
    }
}
