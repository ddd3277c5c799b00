// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Full-document transcript built from the per-page texts.

/// Separator placed between pages in the full-document view.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Join the non-empty, trimmed page texts in page order.
///
/// Returns `None` unless more than one page has text: a lone page is already
/// visible on its own and gets no aggregate view.
pub fn aggregate_text<S: AsRef<str>>(texts: &[S]) -> Option<String> {
    let populated: Vec<&str> = texts
        .iter()
        .map(|text| text.as_ref().trim())
        .filter(|text| !text.is_empty())
        .collect();
    (populated.len() > 1).then(|| populated.join(PAGE_SEPARATOR))
}
