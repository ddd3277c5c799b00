// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk — Read the text out of images and PDFs
//
// Entry point. Initialises logging, backend services, app state, and launches
// the Dioxus UI.

mod pages;
mod services;
mod state;

use dioxus::prelude::*;

use pages::reader::Reader;
use services::app_services::AppServices;
use state::AppState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Lesewerk starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(AppServices::init);

    // Provide services and state as context for all components
    use_context_provider(|| svc.clone());
    use_context_provider(|| Signal::new(AppState::new(&svc.config().idle_prompt)));

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; min-height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px; max-width: 960px; margin: 0 auto; width: 100%; box-sizing: border-box;",
                Reader {}
            }
        }
    }
}
