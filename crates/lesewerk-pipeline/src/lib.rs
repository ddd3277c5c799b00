// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-pipeline — Drives one document through rasterization and OCR.
//
// The orchestrator pulls pages one at a time from a rasterizer, recognises
// each with a single engine handle, and publishes every step through the
// `Presenter` capability interface. Run state is an explicit value threaded
// through the run, and the input surface gates new submissions on it.

pub mod aggregate;
pub mod input;
pub mod orchestrator;
pub mod presenter;
pub mod run;

#[cfg(test)]
mod testing;

pub use aggregate::aggregate_text;
pub use input::{ClipboardItem, IncomingFile, InputSurface, Submission};
pub use orchestrator::Orchestrator;
pub use presenter::{Presenter, SlotHandle, render_aggregate};
pub use run::{PageResult, Progress, RunOutcome, RunPhase, RunReport, RunState, SlotStatus};
