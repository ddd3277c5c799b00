// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Presentation capability interface.
//
// The orchestrator never touches a UI toolkit. It reports slots, progress,
// and the aggregate view through this trait; the desktop app implements it
// over reactive signals and tests implement it over a plain event log.

use lesewerk_document::PageImage;

use crate::aggregate::aggregate_text;

/// Opaque handle to one page's presentation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle(pub usize);

/// Everything the orchestrator needs to show a run to the user.
pub trait Presenter {
    /// Drop every slot left over from a previous run.
    fn clear(&mut self);

    /// Create a slot showing `page`, appended after all existing slots.
    fn append_slot(&mut self, page: &PageImage) -> SlotHandle;

    /// Replace the text shown in `slot`.
    fn update_slot_text(&mut self, slot: SlotHandle, text: &str);

    /// Flag `slot` as having failed recognition.
    fn mark_slot_failed(&mut self, slot: SlotHandle, reason: &str);

    /// Current text of every slot, in slot order. Includes user edits.
    fn slot_texts(&self) -> Vec<String>;

    fn set_aggregate_visible(&mut self, visible: bool);

    fn set_aggregate_content(&mut self, content: &str);

    fn set_progress_text(&mut self, text: &str);

    /// Enable or disable every input channel at once.
    fn set_input_enabled(&mut self, enabled: bool);
}

/// Recompute the full-document view from the slots' current texts.
///
/// Shown only when more than one slot has text; hidden and emptied otherwise.
/// Returns whether the view is visible afterwards.
pub fn render_aggregate<P: Presenter + ?Sized>(presenter: &mut P) -> bool {
    match aggregate_text(&presenter.slot_texts()) {
        Some(content) => {
            presenter.set_aggregate_content(&content);
            presenter.set_aggregate_visible(true);
            true
        }
        None => {
            presenter.set_aggregate_content("");
            presenter.set_aggregate_visible(false);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingPresenter, page_image};

    #[test]
    fn aggregate_tracks_slot_edits() {
        let mut presenter = RecordingPresenter::default();
        let first = presenter.append_slot(&page_image(1));
        let second = presenter.append_slot(&page_image(2));

        presenter.update_slot_text(first, "alpha");
        assert!(!render_aggregate(&mut presenter));
        assert!(!presenter.aggregate_visible);

        presenter.update_slot_text(second, "beta");
        assert!(render_aggregate(&mut presenter));
        assert_eq!(presenter.aggregate_content, "alpha\n\nbeta");

        // A user clears page 2 by hand: the view collapses again.
        presenter.update_slot_text(second, "   ");
        assert!(!render_aggregate(&mut presenter));
        assert!(!presenter.aggregate_visible);
        assert_eq!(presenter.aggregate_content, "");
    }
}
