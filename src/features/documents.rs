// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Document lifecycle notification handlers.
//!
//! Each edit-shaped notification upserts the document text and queues the
//! URI for reindexing through the coalescing queue, so a burst of
//! `didChange` events inside one throttle interval costs one reindex pass
//! over the final text.

use anyhow::Context as _;
use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};
use tracing::debug;

use crate::dispatch::Ctx;

/// Marks a document dirty: coalesce under its URI and arm the throttle.
fn schedule_reindex(ctx: &mut Ctx, uri: String) {
    ctx.changes.put(uri.clone(), uri);
    ctx.change_throttle.trigger();
}

/// `textDocument/didOpen`
pub fn did_open(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<()> {
    let params: DidOpenTextDocumentParams =
        serde_json::from_value(params.clone()).context("invalid didOpen params")?;
    let doc = params.text_document;
    let uri = doc.uri.as_str().to_string();

    debug!(uri = %uri, version = doc.version, "document opened");
    ctx.workspace.open_document(&uri, doc.text, doc.version);
    schedule_reindex(ctx, uri);
    Ok(())
}

/// `textDocument/didChange` — full sync: the last content change carries
/// the complete new text.
pub fn did_change(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<()> {
    let params: DidChangeTextDocumentParams =
        serde_json::from_value(params.clone()).context("invalid didChange params")?;
    let uri = params.text_document.uri.as_str().to_string();

    let Some(change) = params.content_changes.into_iter().last() else {
        return Ok(());
    };
    ctx.workspace
        .update_document(&uri, change.text, params.text_document.version);
    schedule_reindex(ctx, uri);
    Ok(())
}

/// `textDocument/didSave` — the text field is optional; when present it is
/// authoritative.
pub fn did_save(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<()> {
    let params: DidSaveTextDocumentParams =
        serde_json::from_value(params.clone()).context("invalid didSave params")?;
    let uri = params.text_document.uri.as_str().to_string();

    if let Some(text) = params.text {
        // Save notifications carry no version; the stored one stands.
        ctx.workspace.save_document(&uri, text);
    }
    schedule_reindex(ctx, uri);
    Ok(())
}

/// `textDocument/didClose`
pub fn did_close(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<()> {
    let params: DidCloseTextDocumentParams =
        serde_json::from_value(params.clone()).context("invalid didClose params")?;
    let uri = params.text_document.uri.as_str().to_string();

    debug!(uri = %uri, "document closed");
    // Any queued reindex for this URI becomes a no-op once the text is gone.
    ctx.workspace.close_document(&uri);
    Ok(())
}
