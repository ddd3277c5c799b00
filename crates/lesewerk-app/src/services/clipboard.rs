// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clipboard paste bridge.
//
// The webview owns the clipboard, so a document-level `paste` listener is
// installed through `document::eval`. For each paste it sends every
// clipboard item's MIME type, with base64 file data for image items only.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use lesewerk_pipeline::ClipboardItem;
use serde::Deserialize;
use tracing::warn;

/// Installs the listener; each paste is sent back as a JSON array.
pub const PASTE_LISTENER_JS: &str = r#"
document.addEventListener("paste", async (event) => {
    const items = Array.from(event.clipboardData ? event.clipboardData.items : []);
    const payload = await Promise.all(items.map(async (item) => {
        const file = item.kind === "file" && item.type.startsWith("image/") ? item.getAsFile() : null;
        if (!file) {
            return { mime: item.type, data: null };
        }
        const bytes = new Uint8Array(await file.arrayBuffer());
        let binary = "";
        for (let i = 0; i < bytes.length; i++) {
            binary += String.fromCharCode(bytes[i]);
        }
        return { mime: item.type, data: btoa(binary) };
    }));
    dioxus.send(payload);
});
"#;

/// One clipboard item as sent by the listener.
#[derive(Debug, Clone, Deserialize)]
pub struct PastedItem {
    pub mime: String,
    pub data: Option<String>,
}

/// Decode pasted items. Items whose data is not valid base64 keep their MIME
/// type but lose their data.
pub fn into_clipboard_items(items: Vec<PastedItem>) -> Vec<ClipboardItem> {
    items
        .into_iter()
        .map(|item| {
            let data = item.data.and_then(|encoded| match BASE64.decode(encoded) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    warn!(mime = %item.mime, error = %err, "pasted item is not valid base64");
                    None
                }
            });
            ClipboardItem::new(item.mime, data)
        })
        .collect()
}
