// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lesewerk reader.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// MIME type of the only paginated format we accept.
pub const PDF_MIME: &str = "application/pdf";

/// Unique identifier for one document-processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a submitted document is turned into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    /// A single raster image; always exactly one page.
    Image,
    /// A multi-page document (PDF) rendered page by page.
    Paginated,
}

impl MediaKind {
    /// Classify a MIME type. Returns `None` for anything we cannot rasterize.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == PDF_MIME {
            Some(Self::Paginated)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// A user-submitted document, held in memory for the length of one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    /// File name as reported by the input channel ("pasted image" for pastes).
    pub name: String,
    /// MIME type, e.g. `image/png` or `application/pdf`.
    pub mime: String,
    /// Raw encoded bytes.
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Build a document whose MIME type is inferred from the file extension.
    ///
    /// Used for drops and picker selections, which only give us a name.
    pub fn from_named_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self { name, mime, bytes }
    }

    /// Media kind derived from the MIME type, if supported.
    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_mime_is_paginated() {
        assert_eq!(MediaKind::from_mime("application/pdf"), Some(MediaKind::Paginated));
        assert_eq!(MediaKind::from_mime("Application/PDF"), Some(MediaKind::Paginated));
    }

    #[test]
    fn any_image_mime_is_image() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("image/webp"), Some(MediaKind::Image));
    }

    #[test]
    fn other_mimes_are_unsupported() {
        assert_eq!(MediaKind::from_mime("text/plain"), None);
        assert_eq!(MediaKind::from_mime(""), None);
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        let doc = Document::from_named_bytes("scan.PDF", vec![1, 2, 3]);
        assert_eq!(doc.mime, "application/pdf");
        assert_eq!(doc.media_kind(), Some(MediaKind::Paginated));

        let doc = Document::from_named_bytes("photo.jpg", vec![]);
        assert_eq!(doc.media_kind(), Some(MediaKind::Image));

        let doc = Document::from_named_bytes("notes", vec![]);
        assert_eq!(doc.media_kind(), None);
    }

    #[test]
    fn debug_output_omits_bytes() {
        let doc = Document::new("a.png", "image/png", vec![0; 4096]);
        let rendered = format!("{doc:?}");
        assert!(rendered.contains("bytes_len: 4096"));
    }
}
