// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Presenter over the shared `AppState` signal.
//
// Every call forwards to `AppState`'s own `Presenter` impl through a short
// write guard, so the UI re-renders after each step of a run.

use dioxus::prelude::*;
use lesewerk_document::PageImage;
use lesewerk_pipeline::{Presenter, SlotHandle};

use crate::state::AppState;

pub struct SignalPresenter {
    state: Signal<AppState>,
}

impl SignalPresenter {
    pub fn new(state: Signal<AppState>) -> Self {
        Self { state }
    }
}

impl Presenter for SignalPresenter {
    fn clear(&mut self) {
        self.state.write().clear();
    }

    fn append_slot(&mut self, page: &PageImage) -> SlotHandle {
        self.state.write().append_slot(page)
    }

    fn update_slot_text(&mut self, slot: SlotHandle, text: &str) {
        self.state.write().update_slot_text(slot, text);
    }

    fn mark_slot_failed(&mut self, slot: SlotHandle, reason: &str) {
        self.state.write().mark_slot_failed(slot, reason);
    }

    fn slot_texts(&self) -> Vec<String> {
        self.state.read().slot_texts()
    }

    fn set_aggregate_visible(&mut self, visible: bool) {
        self.state.write().set_aggregate_visible(visible);
    }

    fn set_aggregate_content(&mut self, content: &str) {
        self.state.write().set_aggregate_content(content);
    }

    fn set_progress_text(&mut self, text: &str) {
        self.state.write().set_progress_text(text);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.state.write().set_input_enabled(enabled);
    }
}
