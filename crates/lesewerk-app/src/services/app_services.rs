// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration and builds the orchestrator
// the Dioxus UI drives.

use std::path::Path;
use std::sync::Arc;

use lesewerk_core::AppConfig;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_document::ocr::engine::OcrConfig;
use lesewerk_document::{DocumentRasterizer, OcrsBackend};
use lesewerk_pipeline::Orchestrator;
use tracing::{debug, info, warn};

use super::data_dir;

/// The production pipeline: Pdfium/image rasterizer feeding `ocrs`.
pub type DocumentOrchestrator = Orchestrator<DocumentRasterizer, OcrsBackend>;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// Cheap to clone, so it can be moved into spawned run tasks.
#[derive(Clone)]
pub struct AppServices {
    orchestrator: Arc<DocumentOrchestrator>,
    config: Arc<AppConfig>,
}

impl AppServices {
    /// Initialise all services.  Call once at app startup.
    pub fn init() -> Self {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");
        Self::with_config(load_config(&dir))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let ocr_config = OcrConfig::from_optional_dir(config.model_dir.as_deref());
        if !ocr_config.models_available() {
            warn!(
                detection = %ocr_config.detection_model_path.display(),
                "OCR models not found; runs will fail until they are installed"
            );
        }

        let orchestrator = Orchestrator::new(
            DocumentRasterizer::from_config(&config),
            OcrsBackend::new(ocr_config),
            &config,
        );
        info!(
            render_width = config.render_width,
            language = %config.ocr_language,
            "app services initialised"
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }

    pub fn orchestrator(&self) -> Arc<DocumentOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

// -- Config file -------------------------------------------------------------

const CONFIG_FILE: &str = "config.json";

/// Load `config.json` from `data_dir`, falling back to defaults on any problem.
pub fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    match read_config(&path) {
        Ok(Some(config)) => {
            info!(path = %path.display(), "configuration loaded");
            config
        }
        Ok(None) => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            AppConfig::default()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring configuration file");
            AppConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Option<AppConfig>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(LesewerkError::Io(err)),
    };
    let config: AppConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(Some(config))
}
