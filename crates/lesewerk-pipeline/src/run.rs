// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run state and run results.
//
// `RunState` is a plain value: the caller owns it between runs, hands it to
// the orchestrator for the duration of one run, and gets it back reset.

use chrono::{DateTime, Utc};
use lesewerk_core::RunId;
use lesewerk_core::error::LesewerkError;

use crate::presenter::SlotHandle;

/// Lifecycle phase of the single active run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunPhase {
    /// No run active; input may be accepted.
    #[default]
    Idle,
    /// Engine and document being opened.
    Initializing,
    /// Pages being rendered and recognised one at a time.
    StreamingPages,
    /// Engine being released and input re-enabled.
    Finalizing,
}

/// Pages finished versus pages in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

/// Recognition status of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotStatus {
    #[default]
    Pending,
    Recognized,
    Failed { reason: String },
}

/// What happened to one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Original 1-based page number; never renumbered after skipped pages.
    pub page_number: usize,
    pub slot: SlotHandle,
    pub text: String,
    pub status: SlotStatus,
}

/// Mutable state of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    phase: RunPhase,
    input_locked: bool,
    run_id: Option<RunId>,
    progress: Progress,
    results: Vec<PageResult>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Whether new submissions are currently refused.
    pub fn is_locked(&self) -> bool {
        self.input_locked
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn results(&self) -> &[PageResult] {
        &self.results
    }

    /// Refuse further submissions. Called the moment a submission is accepted.
    pub fn lock_input(&mut self) {
        self.input_locked = true;
    }

    pub(crate) fn begin(mut self, run_id: RunId) -> Self {
        self.phase = RunPhase::Initializing;
        self.input_locked = true;
        self.run_id = Some(run_id);
        self.progress = Progress::default();
        self.results.clear();
        self
    }

    pub(crate) fn start_streaming(&mut self, total: usize) {
        self.phase = RunPhase::StreamingPages;
        self.progress = Progress { done: 0, total };
    }

    /// Record a page that has a slot but no text yet; returns its index.
    pub(crate) fn push_page(&mut self, page_number: usize, slot: SlotHandle) -> usize {
        self.results.push(PageResult {
            page_number,
            slot,
            text: String::new(),
            status: SlotStatus::Pending,
        });
        self.results.len() - 1
    }

    pub(crate) fn record_text(&mut self, index: usize, text: &str) {
        if let Some(result) = self.results.get_mut(index) {
            result.text = text.to_string();
            result.status = SlotStatus::Recognized;
        }
    }

    pub(crate) fn record_failure(&mut self, index: usize, reason: String) {
        if let Some(result) = self.results.get_mut(index) {
            result.text.clear();
            result.status = SlotStatus::Failed { reason };
        }
    }

    /// Count one more page as finished and return the new progress.
    pub(crate) fn page_done(&mut self) -> Progress {
        self.progress.done += 1;
        self.progress
    }

    pub(crate) fn start_finalizing(&mut self) {
        self.phase = RunPhase::Finalizing;
    }

    /// Return to idle with input unlocked, handing back the run's page results.
    pub(crate) fn finish(self) -> (Self, Vec<PageResult>) {
        (Self::default(), self.results)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every renderable page went through recognition.
    Completed,
    /// The engine or the document could not be opened.
    Failed(LesewerkError),
    /// A run was already active; nothing was done.
    Rejected,
}

/// Summary of one `Orchestrator::process` call.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Option<RunId>,
    pub outcome: RunOutcome,
    pub pages: Vec<PageResult>,
    /// Page count the document reported, including pages that failed to render.
    pub page_total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub(crate) fn rejected() -> Self {
        let now = Utc::now();
        Self {
            run_id: None,
            outcome: RunOutcome::Rejected,
            pages: Vec::new(),
            page_total: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    pub fn error(&self) -> Option<&LesewerkError> {
        match &self.outcome {
            RunOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Texts of the pages that were recognised, in page order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_locks_and_finish_unlocks() {
        let state = RunState::new().begin(RunId::new());
        assert_eq!(state.phase(), RunPhase::Initializing);
        assert!(state.is_locked());
        assert!(state.run_id().is_some());

        let (state, results) = state.finish();
        assert_eq!(state.phase(), RunPhase::Idle);
        assert!(!state.is_locked());
        assert!(state.run_id().is_none());
        assert!(results.is_empty());
    }

    #[test]
    fn results_keep_page_numbers_and_statuses() {
        let mut state = RunState::new().begin(RunId::new());
        state.start_streaming(3);
        let first = state.push_page(1, SlotHandle(0));
        state.record_text(first, "hello");
        assert_eq!(state.page_done(), Progress { done: 1, total: 3 });
        let third = state.push_page(3, SlotHandle(1));
        state.record_failure(third, "engine choked".into());
        state.page_done();

        let (_, results) = state.finish();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page_number, 1);
        assert_eq!(results[0].status, SlotStatus::Recognized);
        assert_eq!(results[1].page_number, 3);
        assert_eq!(results[1].text, "");
        assert!(matches!(results[1].status, SlotStatus::Failed { .. }));
    }
}
