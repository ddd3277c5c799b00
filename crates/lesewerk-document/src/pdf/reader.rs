// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a PDF and inspect its metadata using the `lopdf` crate.
//
// The page count is read from the page tree without rendering anything, so it
// is available before the first page is produced.

use lopdf::Document;
use lesewerk_core::error::LesewerkError;
use tracing::{debug, instrument};

/// Reads structural metadata from an in-memory PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, LesewerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            LesewerkError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}
