// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for failed runs.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the drop zone presents the notice.

use crate::error::LesewerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth simply trying again.
    Transient,
    /// User must do something first (install models, pick another file).
    ActionRequired,
    /// Retrying will not help: wrong format or a damaged file.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives colour in UI).
    pub severity: Severity,
}

/// Convert a `LesewerkError` into a `HumanError` for the drop zone.
pub fn humanize_error(err: &LesewerkError) -> HumanError {
    match err {
        LesewerkError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file can't be read.".into(),
            suggestion: format!("Use an image (PNG, JPEG, ...) or a PDF. (File type: {detail})"),
            severity: Severity::Permanent,
        },

        LesewerkError::PdfError(detail) if detail.to_lowercase().contains("pdfium") => HumanError {
            message: "PDF display isn't set up yet.".into(),
            suggestion: "The Pdfium library is missing. Install it, place it next to the app, or set pdfium_dir in config.json.".into(),
            severity: Severity::ActionRequired,
        },

        LesewerkError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or password protected. Try opening it in a PDF viewer first, or try a different file.".into(),
            severity: Severity::Permanent,
        },

        LesewerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        LesewerkError::PageRender { page, .. } => HumanError {
            message: format!("Page {page} couldn't be displayed."),
            suggestion: "The rest of the document was still read. Try exporting the PDF again if you need that page.".into(),
            severity: Severity::Permanent,
        },

        LesewerkError::OcrError(detail) => {
            let lower = detail.to_lowercase();
            if lower.contains("model not found") || lower.contains("failed to load") {
                HumanError {
                    message: "Text recognition isn't set up yet.".into(),
                    suggestion: "The recognition models are missing. Run `ocrs` once to download them, or set model_dir in config.json.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Text recognition didn't work on this document.".into(),
                    suggestion: "Try again. A sharper image or a higher-resolution scan usually helps.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        LesewerkError::UnsupportedLanguage(lang) => HumanError {
            message: "That recognition language isn't available.".into(),
            suggestion: format!("Set ocr_language to \"eng\" in config.json. (Configured: {lang})"),
            severity: Severity::ActionRequired,
        },

        LesewerkError::Config(detail) => HumanError {
            message: "The settings file has a problem.".into(),
            suggestion: format!("Fix or delete config.json to use the defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        LesewerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The file couldn't be read.".into(),
                    suggestion: format!("Try again. ({io_err})"),
                    severity: Severity::Transient,
                }
            }
        }

        LesewerkError::Serialization(_) => HumanError {
            message: "Something went wrong reading app data.".into(),
            suggestion: "Try restarting the app.".into(),
            severity: Severity::Transient,
        },
    }
}
