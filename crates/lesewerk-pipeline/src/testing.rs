// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted adapters and a recording presenter sharing one event log.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use lesewerk_core::Document;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_document::{OcrBackend, PageImage, PageSource, Rasterizer, RecognitionSession};

use crate::presenter::{Presenter, SlotHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EngineStarted,
    EngineShutdown,
    Opened,
    Rendered(usize),
    Recognize(usize),
    Cleared,
    SlotAppended(usize),
    SlotText(usize, String),
    SlotFailed(usize),
    AggregateVisible(bool),
    Progress(String),
    InputEnabled(bool),
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

pub fn event_log() -> EventLog {
    EventLog::default()
}

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.0.lock().unwrap().contains(event)
    }

    pub fn count(&self, event: &Event) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == event)
    }
}

pub fn page_image(number: usize) -> PageImage {
    let pixels = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255])));
    PageImage::new(number, pixels, vec![number as u8], "image/jpeg")
}

/// Rasterizer whose pages render or fail according to a script.
pub struct FakeRasterizer {
    log: EventLog,
    script: Vec<bool>,
    fail_open: bool,
}

impl FakeRasterizer {
    /// `count` pages that all render.
    pub fn pages(log: &EventLog, count: usize) -> Self {
        Self::scripted(log, vec![true; count])
    }

    /// One entry per page; `false` pages fail to render.
    pub fn scripted(log: &EventLog, script: Vec<bool>) -> Self {
        Self {
            log: log.clone(),
            script,
            fail_open: false,
        }
    }

    pub fn failing_open(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            script: Vec::new(),
            fail_open: true,
        }
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn open(&self, _document: Document) -> Result<Box<dyn PageSource>> {
        if self.fail_open {
            return Err(LesewerkError::PdfError("trailer missing".into()));
        }
        self.log.push(Event::Opened);
        Ok(Box::new(FakePages {
            log: self.log.clone(),
            script: self.script.clone(),
            next: 0,
        }))
    }
}

struct FakePages {
    log: EventLog,
    script: Vec<bool>,
    next: usize,
}

#[async_trait]
impl PageSource for FakePages {
    fn page_count(&self) -> usize {
        self.script.len()
    }

    async fn render_next(&mut self) -> Option<Result<PageImage>> {
        let renders = *self.script.get(self.next)?;
        self.next += 1;
        let number = self.next;
        if !renders {
            return Some(Err(LesewerkError::PageRender {
                page: number,
                reason: "corrupt content stream".into(),
            }));
        }
        self.log.push(Event::Rendered(number));
        Some(Ok(page_image(number)))
    }
}

/// OCR backend returning canned text per page number (1-based).
pub struct FakeOcr {
    log: EventLog,
    texts: Vec<String>,
    failing_page: Option<usize>,
    fail_start: bool,
}

impl FakeOcr {
    pub fn texts(log: &EventLog, texts: &[&str]) -> Self {
        Self {
            log: log.clone(),
            texts: texts.iter().map(|t| t.to_string()).collect(),
            failing_page: None,
            fail_start: false,
        }
    }

    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

#[async_trait]
impl OcrBackend for FakeOcr {
    async fn start(&self, _language: &str) -> Result<Box<dyn RecognitionSession>> {
        if self.fail_start {
            return Err(LesewerkError::OcrError("model not found".into()));
        }
        self.log.push(Event::EngineStarted);
        Ok(Box::new(FakeSession {
            log: self.log.clone(),
            texts: self.texts.clone(),
            failing_page: self.failing_page,
        }))
    }
}

struct FakeSession {
    log: EventLog,
    texts: Vec<String>,
    failing_page: Option<usize>,
}

#[async_trait]
impl RecognitionSession for FakeSession {
    async fn recognize(&mut self, page: &PageImage) -> Result<String> {
        self.log.push(Event::Recognize(page.number()));
        if self.failing_page == Some(page.number()) {
            return Err(LesewerkError::OcrError("recognition failed".into()));
        }
        Ok(self
            .texts
            .get(page.number() - 1)
            .cloned()
            .unwrap_or_default())
    }

    async fn shutdown(self: Box<Self>) {
        self.log.push(Event::EngineShutdown);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub page_number: usize,
    pub text: String,
    pub failed: bool,
}

/// Presenter that keeps its state in plain fields and logs every call.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    log: EventLog,
    pub slots: Vec<SlotRecord>,
    pub aggregate_visible: bool,
    pub aggregate_content: String,
    pub progress: Vec<String>,
    pub input_enabled: bool,
}

impl RecordingPresenter {
    pub fn with_log(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            input_enabled: true,
            ..Self::default()
        }
    }
}

impl Presenter for RecordingPresenter {
    fn clear(&mut self) {
        self.log.push(Event::Cleared);
        self.slots.clear();
    }

    fn append_slot(&mut self, page: &PageImage) -> SlotHandle {
        self.log.push(Event::SlotAppended(page.number()));
        self.slots.push(SlotRecord {
            page_number: page.number(),
            text: String::new(),
            failed: false,
        });
        SlotHandle(self.slots.len() - 1)
    }

    fn update_slot_text(&mut self, slot: SlotHandle, text: &str) {
        self.log.push(Event::SlotText(slot.0, text.to_string()));
        if let Some(record) = self.slots.get_mut(slot.0) {
            record.text = text.to_string();
        }
    }

    fn mark_slot_failed(&mut self, slot: SlotHandle, _reason: &str) {
        self.log.push(Event::SlotFailed(slot.0));
        if let Some(record) = self.slots.get_mut(slot.0) {
            record.failed = true;
        }
    }

    fn slot_texts(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.text.clone()).collect()
    }

    fn set_aggregate_visible(&mut self, visible: bool) {
        self.log.push(Event::AggregateVisible(visible));
        self.aggregate_visible = visible;
    }

    fn set_aggregate_content(&mut self, content: &str) {
        self.aggregate_content = content.to_string();
    }

    fn set_progress_text(&mut self, text: &str) {
        self.log.push(Event::Progress(text.to_string()));
        self.progress.push(text.to_string());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.log.push(Event::InputEnabled(enabled));
        self.input_enabled = enabled;
    }
}
