// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input surface — gates drop, pick, and paste submissions on the run lock.

use lesewerk_core::Document;
use tracing::{debug, info};

use crate::run::RunState;

/// A file handed over by drag-and-drop or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    /// MIME type if the channel supplied one; guessed from `name` otherwise.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }

    pub fn into_document(self) -> Document {
        match self.mime.filter(|mime| !mime.is_empty()) {
            Some(mime) => Document::new(self.name, mime, self.bytes),
            None => Document::from_named_bytes(self.name, self.bytes),
        }
    }
}

/// One entry of a clipboard paste. `data` is absent for entries that are not files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    pub data: Option<Vec<u8>>,
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, data: Option<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// A document offered through one of the three input channels.
#[derive(Debug, Clone)]
pub enum Submission {
    Dropped(Vec<IncomingFile>),
    Picked(IncomingFile),
    Pasted(Vec<ClipboardItem>),
}

impl Submission {
    pub fn channel(&self) -> &'static str {
        match self {
            Submission::Dropped(_) => "drop",
            Submission::Picked(_) => "picker",
            Submission::Pasted(_) => "paste",
        }
    }
}

/// Drop-target affordance plus the accept/ignore decision for submissions.
#[derive(Debug, Clone, Default)]
pub struct InputSurface {
    highlighted: bool,
}

impl InputSurface {
    /// Whether the drop target currently shows the "accepting input" highlight.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Pointer dragged over the drop target. Highlights only while unlocked.
    pub fn drag_over(&mut self, run: &RunState) -> bool {
        if !run.is_locked() {
            self.highlighted = true;
        }
        self.highlighted
    }

    pub fn drag_leave(&mut self, run: &RunState) {
        if !run.is_locked() {
            self.highlighted = false;
        }
    }

    /// Whether a click on the drop target may open the file picker.
    pub fn request_picker(&self, run: &RunState) -> bool {
        !run.is_locked()
    }

    /// Turn a submission into a document to process, locking `run` at once.
    ///
    /// Returns `None` (a silent no-op, not an error) while a run holds the
    /// lock, for drops with no files, and for pastes without an image item.
    pub fn submit(&mut self, run: &mut RunState, submission: Submission) -> Option<Document> {
        let channel = submission.channel();
        if run.is_locked() {
            debug!(channel, "Input locked, submission ignored");
            return None;
        }

        let document = match submission {
            Submission::Dropped(files) => {
                self.highlighted = false;
                files.into_iter().next().map(IncomingFile::into_document)
            }
            Submission::Picked(file) => Some(file.into_document()),
            Submission::Pasted(items) => first_pasted_image(items),
        };
        let Some(document) = document else {
            debug!(channel, "Submission carried no usable document");
            return None;
        };

        run.lock_input();
        self.highlighted = false;
        info!(channel, name = %document.name, mime = %document.mime, "Document submitted");
        Some(document)
    }
}

/// The first image item of a paste, if it carries data. Later items are ignored.
fn first_pasted_image(items: Vec<ClipboardItem>) -> Option<Document> {
    let item = items.into_iter().find(ClipboardItem::is_image)?;
    let data = item.data?;
    let extension = item.mime.trim_start_matches("image/").to_string();
    Some(Document::new(
        format!("pasted-image.{}", extension),
        item.mime,
        data,
    ))
}
