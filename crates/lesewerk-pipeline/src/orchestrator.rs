// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator — drives one run from submission to cleanup.
//
// Idle -> Initializing -> StreamingPages -> Finalizing -> Idle
//
// Pages are handled strictly one after another: a page's slot is shown, its
// text recognised and written back, and the aggregate refreshed before the
// next page is pulled from the rasterizer. Only engine start and document
// open are fatal, and both still pass through finalization.

use chrono::Utc;
use lesewerk_core::error::Result;
use lesewerk_core::{AppConfig, Document, RunId};
use lesewerk_document::{OcrBackend, Rasterizer, RecognitionSession};
use tracing::{Instrument, error, info, info_span, warn};

use crate::presenter::{Presenter, render_aggregate};
use crate::run::{PageResult, RunOutcome, RunPhase, RunReport, RunState};

/// Shown while the engine and document are being opened.
pub const PROCESSING_FILE: &str = "Processing file...";

/// Runs documents through a rasterizer and an OCR backend.
pub struct Orchestrator<R, O> {
    rasterizer: R,
    ocr: O,
    language: String,
    idle_prompt: String,
}

impl<R: Rasterizer, O: OcrBackend> Orchestrator<R, O> {
    pub fn new(rasterizer: R, ocr: O, config: &AppConfig) -> Self {
        Self {
            rasterizer,
            ocr,
            language: config.ocr_language.clone(),
            idle_prompt: config.idle_prompt.clone(),
        }
    }

    /// Text shown in the drop zone while no run is active.
    pub fn idle_prompt(&self) -> &str {
        &self.idle_prompt
    }

    /// Process `document`, publishing every step through `presenter`.
    ///
    /// `state` must be idle; otherwise the call is rejected without touching
    /// the presenter and `state` is handed back unchanged. The returned state
    /// is always idle with input unlocked.
    pub async fn process<P: Presenter + ?Sized>(
        &self,
        state: RunState,
        document: Document,
        presenter: &mut P,
    ) -> (RunState, RunReport) {
        if state.phase() != RunPhase::Idle {
            warn!(phase = ?state.phase(), "Run already active, submission ignored");
            return (state, RunReport::rejected());
        }

        let run_id = RunId::new();
        let span = info_span!("run", %run_id, document = %document.name, mime = %document.mime);
        self.run(state, run_id, document, presenter)
            .instrument(span)
            .await
    }

    async fn run<P: Presenter + ?Sized>(
        &self,
        state: RunState,
        run_id: RunId,
        document: Document,
        presenter: &mut P,
    ) -> (RunState, RunReport) {
        let started_at = Utc::now();
        let mut state = self.initialize(state, run_id, presenter);

        let mut session = None;
        let result = self
            .stream(&mut state, &mut session, document, presenter)
            .await;
        let page_total = state.progress().total;
        let (state, pages) = self.finalize(state, session, &result, presenter).await;

        let outcome = match result {
            Ok(()) => {
                info!(pages = pages.len(), page_total, "Run complete");
                RunOutcome::Completed
            }
            Err(err) => {
                error!(error = %err, "Run failed");
                RunOutcome::Failed(err)
            }
        };
        let report = RunReport {
            run_id: Some(run_id),
            outcome,
            pages,
            page_total,
            started_at,
            finished_at: Utc::now(),
        };
        (state, report)
    }

    /// Lock input and wipe the previous run's slots before the first await.
    fn initialize<P: Presenter + ?Sized>(
        &self,
        state: RunState,
        run_id: RunId,
        presenter: &mut P,
    ) -> RunState {
        let state = state.begin(run_id);
        presenter.set_input_enabled(false);
        presenter.clear();
        presenter.set_aggregate_content("");
        presenter.set_aggregate_visible(false);
        presenter.set_progress_text(PROCESSING_FILE);
        info!("Run started");
        state
    }

    async fn stream<P: Presenter + ?Sized>(
        &self,
        state: &mut RunState,
        session: &mut Option<Box<dyn RecognitionSession>>,
        document: Document,
        presenter: &mut P,
    ) -> Result<()> {
        let engine = session.insert(self.ocr.start(&self.language).await?);
        let mut pages = self.rasterizer.open(document).await?;

        let total = pages.page_count();
        state.start_streaming(total);
        presenter.set_progress_text(&page_count_text(total));

        while let Some(page) = pages.next_page().await {
            let slot = presenter.append_slot(&page);
            let index = state.push_page(page.number(), slot);

            match engine.recognize(&page).await {
                Ok(text) => {
                    let text = text.trim();
                    presenter.update_slot_text(slot, text);
                    state.record_text(index, text);
                }
                Err(err) => {
                    error!(page = page.number(), error = %err, "Recognition failed");
                    presenter.update_slot_text(slot, "");
                    presenter.mark_slot_failed(slot, &err.to_string());
                    state.record_failure(index, err.to_string());
                }
            }
            render_aggregate(presenter);

            let progress = state.page_done();
            presenter.set_progress_text(&format!("Done {} of {}", progress.done, progress.total));
        }
        Ok(())
    }

    /// Release the engine and unlock input, whatever happened before.
    async fn finalize<P: Presenter + ?Sized>(
        &self,
        mut state: RunState,
        session: Option<Box<dyn RecognitionSession>>,
        result: &Result<()>,
        presenter: &mut P,
    ) -> (RunState, Vec<PageResult>) {
        state.start_finalizing();

        if let Some(session) = session {
            session.shutdown().await;
        }
        if result.is_err() {
            presenter.clear();
            presenter.set_aggregate_content("");
            presenter.set_aggregate_visible(false);
        }

        presenter.set_progress_text(&self.idle_prompt);
        presenter.set_input_enabled(true);

        let (state, pages) = state.finish();
        if result.is_err() {
            return (state, Vec::new());
        }
        (state, pages)
    }
}

/// "Processing 1 page" / "Processing N pages".
fn page_count_text(total: usize) -> String {
    match total {
        1 => "Processing 1 page".to_string(),
        n => format!("Processing {} pages", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesewerk_core::error::LesewerkError;
    use crate::input::{ClipboardItem, IncomingFile, InputSurface, Submission};
    use crate::run::SlotStatus;
    use crate::testing::{Event, FakeOcr, FakeRasterizer, RecordingPresenter, event_log};

    const IDLE: &str = "Drop here";

    fn config() -> AppConfig {
        AppConfig {
            idle_prompt: IDLE.into(),
            ..AppConfig::default()
        }
    }

    fn image_doc() -> Document {
        Document::new("scan.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn pdf_doc() -> Document {
        Document::new("letter.pdf", "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[tokio::test]
    async fn scenario_a_single_image_has_one_slot_and_no_aggregate() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 1),
            FakeOcr::texts(&log, &["  Hello world \n"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (state, report) = orchestrator
            .process(RunState::new(), image_doc(), &mut presenter)
            .await;

        assert!(report.is_completed());
        assert_eq!(presenter.slots.len(), 1);
        assert_eq!(presenter.slots[0].text, "Hello world");
        assert!(!presenter.aggregate_visible);
        assert!(!log.contains(&Event::AggregateVisible(true)));
        assert_eq!(report.texts(), vec!["Hello world"]);
        assert_eq!(presenter.progress[1], "Processing 1 page");
        assert_eq!(state.phase(), RunPhase::Idle);
        assert!(!state.is_locked());
    }

    #[tokio::test]
    async fn scenario_b_three_pages_with_an_empty_middle_page() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 3),
            FakeOcr::texts(&log, &["Page1", "", "Page3"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (_, report) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert!(report.is_completed());
        assert_eq!(report.page_total, 3);
        let texts: Vec<&str> = presenter.slots.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Page1", "", "Page3"]);
        let numbers: Vec<usize> = presenter.slots.iter().map(|s| s.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(presenter.aggregate_visible);
        assert_eq!(presenter.aggregate_content, "Page1\n\nPage3");
    }

    #[tokio::test]
    async fn scenario_c_paste_runs_like_a_picked_file() {
        let png = vec![0x89, b'P', b'N', b'G'];

        let picked = {
            let log = event_log();
            let orchestrator = Orchestrator::new(
                FakeRasterizer::pages(&log, 1),
                FakeOcr::texts(&log, &["receipt"]),
                &config(),
            );
            let mut state = RunState::new();
            let mut surface = InputSurface::default();
            let document = surface
                .submit(
                    &mut state,
                    Submission::Picked(IncomingFile::new("scan.png", Some("image/png"), png.clone())),
                )
                .expect("picked file accepted");
            let mut presenter = RecordingPresenter::with_log(&log);
            orchestrator.process(state, document, &mut presenter).await;
            presenter.slots
        };

        let pasted = {
            let log = event_log();
            let orchestrator = Orchestrator::new(
                FakeRasterizer::pages(&log, 1),
                FakeOcr::texts(&log, &["receipt"]),
                &config(),
            );
            let mut state = RunState::new();
            let mut surface = InputSurface::default();
            let document = surface
                .submit(
                    &mut state,
                    Submission::Pasted(vec![
                        ClipboardItem::new("text/plain", Some(b"caption".to_vec())),
                        ClipboardItem::new("image/png", Some(png.clone())),
                    ]),
                )
                .expect("pasted image accepted");
            assert!(state.is_locked());
            assert_eq!(document.mime, "image/png");
            let mut presenter = RecordingPresenter::with_log(&log);
            let (state, report) = orchestrator.process(state, document, &mut presenter).await;
            assert!(report.is_completed());
            assert!(!state.is_locked());
            presenter.slots
        };

        assert_eq!(pasted, picked);
    }

    #[tokio::test]
    async fn scenario_d_drop_while_locked_changes_nothing() {
        let log = event_log();
        let presenter = RecordingPresenter::with_log(&log);
        let mut surface = InputSurface::default();
        let mut state = RunState::new();
        state.lock_input();
        let before = log.len();

        let accepted = surface.submit(
            &mut state,
            Submission::Dropped(vec![IncomingFile::new("a.png", None, vec![1])]),
        );

        assert!(accepted.is_none());
        assert!(state.is_locked());
        assert_eq!(state.phase(), RunPhase::Idle);
        assert!(presenter.slots.is_empty());
        assert_eq!(log.len(), before);
    }

    #[tokio::test]
    async fn active_run_state_is_rejected_without_side_effects() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 2),
            FakeOcr::texts(&log, &["a", "b"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);
        let busy = RunState::new().begin(RunId::new());

        let (state, report) = orchestrator.process(busy, image_doc(), &mut presenter).await;

        assert!(matches!(report.outcome, RunOutcome::Rejected));
        assert_eq!(state.phase(), RunPhase::Initializing);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn failed_render_is_skipped_without_renumbering() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::scripted(&log, vec![true, false, true, true]),
            FakeOcr::texts(&log, &["one", "two", "three", "four"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (_, report) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert!(report.is_completed());
        assert_eq!(report.page_total, 4);
        let numbers: Vec<usize> = report.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 3, 4]);
        assert_eq!(report.texts(), vec!["one", "three", "four"]);
        assert!(!log.contains(&Event::Recognize(2)));
        assert_eq!(presenter.aggregate_content, "one\n\nthree\n\nfour");
    }

    #[tokio::test]
    async fn recognition_failure_leaves_an_empty_failed_slot() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 3),
            FakeOcr::texts(&log, &["first", "", "third"]).failing_on(2),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (state, report) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert!(report.is_completed());
        assert_eq!(presenter.slots.len(), 3);
        assert!(presenter.slots[1].failed);
        assert_eq!(presenter.slots[1].text, "");
        assert!(matches!(report.pages[1].status, SlotStatus::Failed { .. }));
        assert_eq!(report.pages[2].status, SlotStatus::Recognized);
        assert_eq!(presenter.aggregate_content, "first\n\nthird");
        assert_eq!(log.count(&Event::EngineShutdown), 1);
        assert!(!state.is_locked());
    }

    #[tokio::test]
    async fn engine_start_failure_still_unlocks_input() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 2),
            FakeOcr::texts(&log, &["a", "b"]).failing_start(),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (state, report) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert!(matches!(report.error(), Some(LesewerkError::OcrError(_))));
        assert!(report.pages.is_empty());
        assert!(!log.contains(&Event::Opened));
        assert_eq!(log.count(&Event::EngineShutdown), 0);
        assert!(presenter.input_enabled);
        assert_eq!(presenter.progress.last().map(String::as_str), Some(IDLE));
        assert_eq!(state.phase(), RunPhase::Idle);
        assert!(!state.is_locked());
    }

    #[tokio::test]
    async fn open_failure_shuts_the_engine_down_once() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::failing_open(&log),
            FakeOcr::texts(&log, &[]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (state, report) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert!(matches!(report.error(), Some(LesewerkError::PdfError(_))));
        assert_eq!(log.count(&Event::EngineStarted), 1);
        assert_eq!(log.count(&Event::EngineShutdown), 1);
        assert!(presenter.slots.is_empty());
        assert!(!presenter.aggregate_visible);
        assert!(presenter.input_enabled);
        assert!(!state.is_locked());
    }

    #[tokio::test]
    async fn input_stays_locked_for_the_whole_run() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 2),
            FakeOcr::texts(&log, &["a", "b"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        let events = log.snapshot();
        assert_eq!(events.first(), Some(&Event::InputEnabled(false)));
        assert_eq!(events.last(), Some(&Event::InputEnabled(true)));
        assert_eq!(log.count(&Event::InputEnabled(true)), 1);

        // Engine lifetime sits inside the locked span.
        let started = log.position(&Event::EngineStarted).expect("engine started");
        let shutdown = log.position(&Event::EngineShutdown).expect("engine shut down");
        assert!(started < shutdown);
        assert_eq!(log.count(&Event::EngineStarted), 1);
    }

    #[tokio::test]
    async fn pages_are_shown_before_recognition_and_never_overlap() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 3),
            FakeOcr::texts(&log, &["a", "b", "c"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        let page_events: Vec<Event> = log
            .snapshot()
            .into_iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::Rendered(_) | Event::SlotAppended(_) | Event::Recognize(_) | Event::SlotText(..)
                )
            })
            .collect();
        let mut expected = Vec::new();
        for (page, text) in [(1, "a"), (2, "b"), (3, "c")] {
            expected.push(Event::Rendered(page));
            expected.push(Event::SlotAppended(page));
            expected.push(Event::Recognize(page));
            expected.push(Event::SlotText(page - 1, text.to_string()));
        }
        assert_eq!(page_events, expected);
    }

    #[tokio::test]
    async fn progress_texts_follow_the_run() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 2),
            FakeOcr::texts(&log, &["a", "b"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;

        assert_eq!(
            presenter.progress,
            vec![
                PROCESSING_FILE.to_string(),
                "Processing 2 pages".to_string(),
                "Done 1 of 2".to_string(),
                "Done 2 of 2".to_string(),
                IDLE.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn a_new_run_clears_the_previous_slots() {
        let log = event_log();
        let orchestrator = Orchestrator::new(
            FakeRasterizer::pages(&log, 2),
            FakeOcr::texts(&log, &["a", "b"]),
            &config(),
        );
        let mut presenter = RecordingPresenter::with_log(&log);

        let (state, _) = orchestrator
            .process(RunState::new(), pdf_doc(), &mut presenter)
            .await;
        let (_, report) = orchestrator.process(state, pdf_doc(), &mut presenter).await;

        assert!(report.is_completed());
        assert_eq!(presenter.slots.len(), 2);
        assert_eq!(log.count(&Event::EngineStarted), 2);
        assert_eq!(log.count(&Event::EngineShutdown), 2);
    }
}
