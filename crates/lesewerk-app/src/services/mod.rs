// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the Dioxus UI to the lesewerk backend crates.

pub mod app_services;
pub mod clipboard;
pub mod data_dir;
pub mod presenter;
