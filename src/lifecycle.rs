// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! The four lifecycle methods: initialize, initialized, shutdown, exit.
//!
//! These are the only handlers that advance [`LifecyclePhase`]. Well-behaved
//! peers send `exit` after `shutdown`, but `exit` is honored from any phase.

use anyhow::Context as _;
use lsp_types::{
    CompletionOptions, HoverProviderCapability, InitializeParams, InitializeResult,
    ServerCapabilities, ServerInfo, SignatureHelpOptions, TextDocumentSyncCapability,
    TextDocumentSyncKind,
};
use tracing::{debug, info, warn};

use crate::dispatch::Ctx;
use crate::state::LifecyclePhase;

/// `initialize` request: records client identity, negotiates capabilities,
/// answers with the server's capability set.
#[allow(
    deprecated,
    reason = "root_uri/root_path are how most clients still send the workspace root"
)]
pub fn initialize(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let params: InitializeParams =
        serde_json::from_value(params.clone()).context("invalid initialize params")?;

    if ctx.state.phase != LifecyclePhase::Uninitialized {
        warn!(phase = ?ctx.state.phase, "initialize received after handshake already started");
    }

    ctx.state.process_id = params.process_id.map(i64::from);
    ctx.state.root_uri = params.root_uri.as_ref().map(|u| u.as_str().to_string());
    ctx.state.root_path = params.root_path.clone();
    ctx.state.initialization_options = params.initialization_options.unwrap_or_default();
    ctx.state.client_capabilities = serde_json::to_value(&params.capabilities)?;
    ctx.state.phase = LifecyclePhase::Initializing;

    info!(
        process_id = ?ctx.state.process_id,
        root = ctx.state.root_uri.as_deref().unwrap_or("<none>"),
        "initialize: handshake started"
    );

    let result = InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![".".to_string(), "(".to_string()]),
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            signature_help_provider: Some(SignatureHelpOptions {
                trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                retrigger_characters: None,
                work_done_progress_options: Default::default(),
            }),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: "signet-ls".to_string(),
            version: Some(env!("SIGNET_VERSION").to_string()),
        }),
    };

    Ok(serde_json::to_value(result)?)
}

/// `initialized` notification: handshake complete. Setup deferred past the
/// handshake happens here — builtin signatures from the config become
/// visible to lookups.
pub fn initialized(ctx: &mut Ctx, _params: &serde_json::Value) -> anyhow::Result<()> {
    ctx.state.phase = LifecyclePhase::Initialized;
    let installed = ctx.workspace.install_builtins();
    info!(builtins = installed, "initialized: handshake complete");
    Ok(())
}

/// `shutdown` request: acknowledge and stop accepting feature work. Does
/// not stop the loop; that is `exit`'s job.
pub fn shutdown(ctx: &mut Ctx, _params: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    ctx.state.phase = LifecyclePhase::ShuttingDown;
    info!("shutdown acknowledged, waiting for exit");
    Ok(serde_json::Value::Null)
}

/// `exit` notification: sets the exit flag unconditionally. The event loop
/// observes it at the top of its next tick.
pub fn exit(ctx: &mut Ctx, _params: &serde_json::Value) -> anyhow::Result<()> {
    debug!(phase = ?ctx.state.phase, "exit requested");
    ctx.state.request_exit();
    Ok(())
}
