// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reader page — drop, pick, or paste a document and read its text page by page.
//
// Pages appear as soon as they are rendered; each gets an editable text area
// filled in once recognition finishes. With more than one populated page a
// read-only "Full document" view joins them.

use dioxus::prelude::*;

use lesewerk_core::error::LesewerkError;
use lesewerk_core::human_errors::{Severity, humanize_error};
use lesewerk_pipeline::{IncomingFile, Submission};

use crate::services::app_services::AppServices;
use crate::services::clipboard::{PASTE_LISTENER_JS, PastedItem, into_clipboard_items};
use crate::services::presenter::SignalPresenter;
use crate::state::{AppState, SlotView, text_rows};

/// Extensions offered by the file picker.
const PICKER_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "pdf",
];

#[component]
pub fn Reader() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    // Clipboard paste anywhere in the window
    use_future(move || {
        let svc = svc.clone();
        async move {
            let mut listener = document::eval(PASTE_LISTENER_JS);
            loop {
                match listener.recv::<Vec<PastedItem>>().await {
                    Ok(items) => {
                        let items = into_clipboard_items(items);
                        submit(state, &svc, Submission::Pasted(items));
                    }
                    Err(err) => {
                        tracing::warn!(error = ?err, "paste listener stopped");
                        break;
                    }
                }
            }
        }
    });

    rsx! {
        div {
            h1 { "Lesewerk" }
            p { style: "color: #666;", "Read the text out of images and PDFs." }

            DropZone {}
            ErrorNotice {}
            PageList {}
            FullDocument {}
        }
    }
}

/// Hand a submission to the input surface and, if accepted, start a run.
fn submit(mut state: Signal<AppState>, svc: &AppServices, submission: Submission) {
    let (document, run) = {
        let mut guard = state.write();
        let app = &mut *guard;
        let Some(document) = app.surface.submit(&mut app.run, submission) else {
            return;
        };
        app.last_error = None;
        app.input_enabled = false;
        (document, app.run.clone())
    };

    let orchestrator = svc.orchestrator();
    spawn(async move {
        let mut presenter = SignalPresenter::new(state);
        let (run, report) = orchestrator.process(run, document, &mut presenter).await;

        let mut app = state.write();
        app.run = run;
        if let Some(err) = report.error() {
            app.last_error = Some(humanize_error(err));
        }
    });
}

/// Open the file dialog and read the chosen file.
fn pick_file(mut state: Signal<AppState>, svc: &AppServices) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Images and PDF", PICKER_EXTENSIONS)
        .pick_file()
    else {
        return;
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".into());
    match std::fs::read(&path) {
        Ok(bytes) => {
            tracing::info!(file = %name, bytes = bytes.len(), "file loaded");
            submit(state, svc, Submission::Picked(IncomingFile::new(name, None, bytes)));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to read file");
            state.write().last_error = Some(humanize_error(&LesewerkError::Io(e)));
        }
    }
}

#[component]
fn DropZone() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let (enabled, highlighted, prompt) = {
        let app = state.read();
        (
            app.input_enabled,
            app.surface.is_highlighted(),
            app.progress_text.clone(),
        )
    };
    let border = if highlighted { "#007aff" } else { "#ccc" };
    let background = if highlighted { "#e7f3ff" } else { "white" };
    let opacity = if enabled { "1" } else { "0.6" };
    let cursor = if enabled { "pointer" } else { "progress" };

    rsx! {
        div {
            style: "padding: 32px 16px; margin: 16px 0; border: 2px dashed {border}; border-radius: 12px; background: {background}; opacity: {opacity}; cursor: {cursor}; text-align: center; color: #333; font-size: 16px;",
            onclick: {
                let svc = svc.clone();
                move |_| {
                    let allowed = {
                        let app = state.read();
                        app.surface.request_picker(&app.run)
                    };
                    if allowed {
                        pick_file(state, &svc);
                    }
                }
            },
            ondragover: move |evt| {
                evt.prevent_default();
                let mut guard = state.write();
                let app = &mut *guard;
                app.surface.drag_over(&app.run);
            },
            ondragleave: move |_| {
                let mut guard = state.write();
                let app = &mut *guard;
                app.surface.drag_leave(&app.run);
            },
            ondrop: {
                let svc = svc.clone();
                move |evt: DragEvent| {
                    evt.prevent_default();
                    if state.read().run.is_locked() {
                        return;
                    }
                    let files = evt.files();
                    let svc = svc.clone();
                    spawn(async move {
                        let mut incoming = Vec::with_capacity(files.len());
                        for file in files {
                            match file.read_bytes().await {
                                Ok(bytes) => incoming.push(IncomingFile::new(
                                    file.name(),
                                    file.content_type().as_deref(),
                                    bytes.to_vec(),
                                )),
                                Err(err) => {
                                    tracing::warn!(file = %file.name(), error = %err, "could not read dropped file");
                                }
                            }
                        }
                        submit(state, &svc, Submission::Dropped(incoming));
                    });
                }
            },
            "{prompt}"
        }
    }
}

#[component]
fn ErrorNotice() -> Element {
    let state = use_context::<Signal<AppState>>();
    let Some(err) = state.read().last_error.clone() else {
        return rsx! {};
    };

    let (color, bg) = match err.severity {
        Severity::Transient => ("#856404", "#fff3cd"),
        Severity::ActionRequired => ("#004085", "#e7f3ff"),
        Severity::Permanent => ("#721c24", "#f8d7da"),
    };

    rsx! {
        div { style: "padding: 12px 16px; margin-bottom: 16px; border-radius: 8px; color: {color}; background: {bg};",
            strong { "{err.message}" }
            p { style: "margin: 4px 0 0; font-size: 14px;", "{err.suggestion}" }
        }
    }
}

#[component]
fn PageList() -> Element {
    let state = use_context::<Signal<AppState>>();
    let slots = state.read().slots.clone();

    rsx! {
        for (index, slot) in slots.into_iter().enumerate() {
            PageSlot { key: "{index}", index, slot }
        }
    }
}

#[component]
fn PageSlot(index: usize, slot: SlotView) -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let rows = slot.rows();
    let placeholder = slot.placeholder();
    let page = slot.page_number;

    rsx! {
        section { style: "display: flex; gap: 16px; margin: 16px 0; align-items: flex-start;",
            img {
                style: "width: 45%; border: 1px solid #e0e0e0; border-radius: 4px;",
                src: "{slot.image_src}",
                alt: "Page {page}",
            }
            textarea {
                style: "flex: 1; padding: 12px; font-family: monospace; font-size: 14px; border: 1px solid #ccc; border-radius: 8px; resize: vertical;",
                rows: "{rows}",
                placeholder: placeholder,
                value: "{slot.text}",
                oninput: move |evt| state.write().edit_slot(index, evt.value()),
            }
        }
    }
}

#[component]
fn FullDocument() -> Element {
    let state = use_context::<Signal<AppState>>();
    let (visible, text) = {
        let app = state.read();
        (app.aggregate_visible, app.aggregate_text.clone())
    };
    if !visible {
        return rsx! {};
    }
    let rows = text_rows(&text);

    rsx! {
        section { style: "margin-top: 24px;",
            h3 { "Full document" }
            textarea {
                style: "width: 100%; padding: 12px; font-family: monospace; font-size: 14px; border: 1px solid #ccc; border-radius: 8px; background: #fafafa; resize: vertical; box-sizing: border-box;",
                readonly: true,
                rows: "{rows}",
                value: "{text}",
            }
        }
    }
}
