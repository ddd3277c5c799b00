// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page rendering through Pdfium (`pdfium-render`).
//
// Each open PDF gets its own render thread. The thread binds Pdfium, parses
// the document once, then renders pages on request until the worker handle
// is dropped. Pdfium handles never leave that thread.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use image::DynamicImage;
use lesewerk_core::error::{LesewerkError, Result};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

/// Outcome of the default library search (executable dir, then system).
enum LibraryState {
    Unresolved,
    /// `Some(dir)`: next to the executable. `None`: the system library.
    Found(Option<PathBuf>),
    Missing(String),
}

/// The default search runs once per process; later binds reuse its result.
static DEFAULT_LIBRARY: Lazy<Mutex<LibraryState>> =
    Lazy::new(|| Mutex::new(LibraryState::Unresolved));

/// Renders the pages of one loaded PDF at a fixed target width.
pub struct PdfRenderWorker {
    requests: mpsc::Sender<RenderRequest>,
}

struct RenderRequest {
    index: usize,
    reply: oneshot::Sender<Result<DynamicImage>>,
}

impl PdfRenderWorker {
    /// Start a render thread for `bytes`.
    ///
    /// Fails if Pdfium cannot be bound or cannot parse the document, so a
    /// missing library surfaces here rather than on every page. With
    /// `pdfium_dir` set only that directory is searched.
    #[instrument(skip(bytes, pdfium_dir), fields(bytes_len = bytes.len()))]
    pub async fn start(
        bytes: Arc<[u8]>,
        target_width: u32,
        pdfium_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let width = i32::try_from(target_width).map_err(|_| {
            LesewerkError::PdfError(format!("render width {} is out of range", target_width))
        })?;

        let (ready_tx, ready_rx) = oneshot::channel();
        let (requests, receiver) = mpsc::channel(1);
        thread::Builder::new()
            .name("pdfium-render".into())
            .spawn(move || serve(bytes, width, pdfium_dir, ready_tx, receiver))
            .map_err(|err| {
                LesewerkError::PdfError(format!("failed to start render thread: {}", err))
            })?;

        ready_rx.await.map_err(|_| {
            LesewerkError::PdfError("render thread exited during start-up".into())
        })??;
        Ok(Self { requests })
    }

    /// Render one page (0-indexed). Height follows the page's aspect ratio.
    pub async fn render(&self, page_index: usize) -> Result<DynamicImage> {
        let page = page_index + 1;
        let stopped = || LesewerkError::PageRender {
            page,
            reason: "render thread stopped".into(),
        };

        let (reply, response) = oneshot::channel();
        self.requests
            .send(RenderRequest {
                index: page_index,
                reply,
            })
            .await
            .map_err(|_| stopped())?;
        response.await.map_err(|_| stopped())?
    }
}

fn serve(
    bytes: Arc<[u8]>,
    width: i32,
    pdfium_dir: Option<PathBuf>,
    ready: oneshot::Sender<Result<()>>,
    mut requests: mpsc::Receiver<RenderRequest>,
) {
    let pdfium = match bind_pdfium(pdfium_dir.as_deref()) {
        Ok(pdfium) => pdfium,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };
    let document = match pdfium.load_pdf_from_byte_slice(&bytes, None) {
        Ok(document) => document,
        Err(err) => {
            let _ = ready.send(Err(LesewerkError::PdfError(format!(
                "failed to open PDF: {}",
                err
            ))));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        return;
    }

    let config = PdfRenderConfig::new()
        .set_target_width(width)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);
    while let Some(request) = requests.blocking_recv() {
        let _ = request
            .reply
            .send(render_page(&document, &config, request.index));
    }
    debug!("Render thread finished");
}

#[instrument(skip(document, config), fields(page = page_index + 1))]
fn render_page(
    document: &PdfDocument<'_>,
    config: &PdfRenderConfig,
    page_index: usize,
) -> Result<DynamicImage> {
    let page_number = page_index + 1;
    let index = u16::try_from(page_index).map_err(|_| LesewerkError::PageRender {
        page: page_number,
        reason: "page index exceeds Pdfium's page range".into(),
    })?;
    let page = document
        .pages()
        .get(index)
        .map_err(|err| LesewerkError::PageRender {
            page: page_number,
            reason: err.to_string(),
        })?;

    let bitmap = page
        .render_with_config(config)
        .map_err(|err| LesewerkError::PageRender {
            page: page_number,
            reason: err.to_string(),
        })?;

    let image = DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8());
    debug!(
        width = image.width(),
        height = image.height(),
        "Page rendered"
    );
    Ok(image)
}

/// Bind Pdfium from `dir` only, or by the default search when `dir` is `None`.
fn bind_pdfium(dir: Option<&Path>) -> Result<Pdfium> {
    let bindings = match dir {
        Some(dir) => bind_at(dir)?,
        None => bind_default()?,
    };
    Ok(Pdfium::new(bindings))
}

fn bind_at(dir: &Path) -> Result<Box<dyn PdfiumLibraryBindings>> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).map_err(|err| {
        LesewerkError::PdfError(format!(
            "failed to load Pdfium from {}: {}",
            dir.display(),
            err
        ))
    })
}

fn bind_system() -> Result<Box<dyn PdfiumLibraryBindings>> {
    Pdfium::bind_to_system_library().map_err(|err| {
        LesewerkError::PdfError(format!("failed to load system Pdfium: {}", err))
    })
}

/// Next to the executable first, then the system library.
fn bind_default() -> Result<Box<dyn PdfiumLibraryBindings>> {
    let mut state = DEFAULT_LIBRARY.lock().map_err(|err| {
        LesewerkError::PdfError(format!("Pdfium state lock poisoned: {}", err))
    })?;
    match &*state {
        LibraryState::Found(Some(dir)) => return bind_at(dir),
        LibraryState::Found(None) => return bind_system(),
        LibraryState::Missing(reason) => return Err(LesewerkError::PdfError(reason.clone())),
        LibraryState::Unresolved => {}
    }

    if let Some(dir) = executable_dir() {
        if let Ok(bindings) = bind_at(&dir) {
            info!(path = %dir.display(), "Using Pdfium next to the executable");
            *state = LibraryState::Found(Some(dir));
            return Ok(bindings);
        }
    }
    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            info!("Using system Pdfium");
            *state = LibraryState::Found(None);
            Ok(bindings)
        }
        Err(err) => {
            let reason = format!(
                "Pdfium library not found next to the executable or on the system: {}",
                err
            );
            *state = LibraryState::Missing(reason.clone());
            Err(LesewerkError::PdfError(reason))
        }
    }
}

fn executable_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::blank_pdf;

    #[tokio::test]
    async fn missing_library_fails_to_start() {
        let result =
            PdfRenderWorker::start(blank_pdf(1).into(), 1000, Some("/nonexistent/pdfium".into()))
                .await;
        assert!(matches!(result, Err(LesewerkError::PdfError(msg)) if msg.contains("/nonexistent/pdfium")));
    }

    #[tokio::test]
    async fn width_beyond_i32_is_rejected() {
        let result = PdfRenderWorker::start(blank_pdf(1).into(), u32::MAX, None).await;
        assert!(matches!(result, Err(LesewerkError::PdfError(msg)) if msg.contains("out of range")));
    }

    #[test]
    fn executable_dir_is_absolute() {
        let dir = executable_dir().expect("test binary has a parent directory");
        assert!(dir.is_absolute());
    }

    #[tokio::test]
    #[ignore] // Needs a Pdfium shared library on the system
    async fn renders_blank_page_at_target_width() {
        let worker = PdfRenderWorker::start(blank_pdf(2).into(), 1000, None)
            .await
            .expect("start worker");
        let image = worker.render(1).await.expect("render page");
        assert_eq!(image.width(), 1000);
        assert_eq!(image.height(), 1294);
    }

    #[tokio::test]
    #[ignore] // Needs a Pdfium shared library on the system
    async fn missing_page_is_a_page_render_error() {
        let worker = PdfRenderWorker::start(blank_pdf(1).into(), 1000, None)
            .await
            .expect("start worker");
        let result = worker.render(5).await;
        assert!(matches!(result, Err(LesewerkError::PageRender { page: 6, .. })));
    }
}
