// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.
//
// `AppState` is the concrete presenter: the orchestrator writes slots,
// progress, and the aggregate view into it through a `Signal`.

use lesewerk_core::human_errors::HumanError;
use lesewerk_document::PageImage;
use lesewerk_pipeline::{InputSurface, Presenter, RunState, SlotHandle, SlotStatus, render_aggregate};

/// Placeholder shown while a page waits for recognition.
pub const PENDING_PLACEHOLDER: &str = "OCR in progress...";
/// Placeholder shown when recognition failed for a page.
pub const FAILED_PLACEHOLDER: &str = "No text recognised";

/// One page as displayed: its image and its editable text.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub page_number: usize,
    /// `data:` URL for the `<img>` element.
    pub image_src: String,
    pub text: String,
    pub status: SlotStatus,
}

impl SlotView {
    pub fn placeholder(&self) -> &'static str {
        match self.status {
            SlotStatus::Pending => PENDING_PLACEHOLDER,
            SlotStatus::Failed { .. } => FAILED_PLACEHOLDER,
            SlotStatus::Recognized => "",
        }
    }

    /// Textarea height that fits the text without scrolling.
    pub fn rows(&self) -> usize {
        text_rows(&self.text)
    }
}

/// Rows needed to show `text` plus one spare line.
pub fn text_rows(text: &str) -> usize {
    text.lines().count() + 1
}

/// Shared state accessible to all components via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Run lock and progress, handed to the orchestrator for each run.
    pub run: RunState,
    /// Drop-target highlight.
    pub surface: InputSurface,
    pub slots: Vec<SlotView>,
    pub aggregate_visible: bool,
    pub aggregate_text: String,
    /// Text shown inside the drop zone.
    pub progress_text: String,
    pub input_enabled: bool,
    /// Why the last run failed, until the next submission.
    pub last_error: Option<HumanError>,
}

impl AppState {
    pub fn new(idle_prompt: &str) -> Self {
        Self {
            run: RunState::new(),
            surface: InputSurface::default(),
            slots: Vec::new(),
            aggregate_visible: false,
            aggregate_text: String::new(),
            progress_text: idle_prompt.to_string(),
            input_enabled: true,
            last_error: None,
        }
    }

    /// Apply a user edit to a page's text and refresh the full-document view.
    pub fn edit_slot(&mut self, index: usize, text: String) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.text = text;
            render_aggregate(self);
        }
    }
}

impl Presenter for AppState {
    fn clear(&mut self) {
        self.slots.clear();
    }

    fn append_slot(&mut self, page: &PageImage) -> SlotHandle {
        self.slots.push(SlotView {
            page_number: page.number(),
            image_src: page.data_url(),
            text: String::new(),
            status: SlotStatus::Pending,
        });
        SlotHandle(self.slots.len() - 1)
    }

    fn update_slot_text(&mut self, slot: SlotHandle, text: &str) {
        if let Some(view) = self.slots.get_mut(slot.0) {
            view.text = text.to_string();
            view.status = SlotStatus::Recognized;
        }
    }

    fn mark_slot_failed(&mut self, slot: SlotHandle, reason: &str) {
        if let Some(view) = self.slots.get_mut(slot.0) {
            view.status = SlotStatus::Failed {
                reason: reason.to_string(),
            };
        }
    }

    fn slot_texts(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.text.clone()).collect()
    }

    fn set_aggregate_visible(&mut self, visible: bool) {
        self.aggregate_visible = visible;
    }

    fn set_aggregate_content(&mut self, content: &str) {
        self.aggregate_text = content.to_string();
    }

    fn set_progress_text(&mut self, text: &str) {
        self.progress_text = text.to_string();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }
}
