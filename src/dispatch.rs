// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Method dispatch tables and handler failure containment.
//!
//! Two immutable name→handler tables, one for requests and one for
//! notifications, built once at startup. A request always yields exactly
//! one response: unknown methods become `MethodNotFound`, handler errors
//! become `InternalError`. Notification failures have no reply channel, so
//! they are logged and dropped. Nothing a handler does can escape to the
//! event loop.

use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::features::{documents, intel, workspace::Workspace};
use crate::lifecycle;
use crate::queue::{NamedQueue, Queue};
use crate::rpc::protocol::{
    INTERNAL_ERROR, METHOD_NOT_FOUND, NotificationMessage, RequestMessage, ResponseMessage,
};
use crate::state::ServerState;
use crate::throttle::Throttle;

/// Everything a handler may touch, borrowed from the engine for the
/// duration of one dispatch. Single-threaded, so no locking discipline
/// beyond "only inside a tick".
pub struct Ctx<'a> {
    /// Lifecycle state; mutated only by the lifecycle handlers.
    pub state: &'a mut ServerState,
    /// Document store and signature index.
    pub workspace: &'a mut Workspace,
    /// Coalescing queue of document URIs awaiting reindex.
    pub changes: &'a mut NamedQueue<String>,
    /// Rate gate for the reindex pass; handlers trigger it after edits.
    pub change_throttle: &'a mut Throttle,
    /// Outgoing notifications produced off the request/response path,
    /// flushed FIFO by the event loop.
    pub replies: &'a mut Queue<NotificationMessage>,
}

/// A request handler: returns the `result` value for the response.
pub type RequestHandler = fn(&mut Ctx, &serde_json::Value) -> anyhow::Result<serde_json::Value>;

/// A notification handler: produces no reply.
pub type NotificationHandler = fn(&mut Ctx, &serde_json::Value) -> anyhow::Result<()>;

/// Immutable method routing tables.
pub struct DispatchTable {
    requests: HashMap<&'static str, RequestHandler>,
    notifications: HashMap<&'static str, NotificationHandler>,
}

impl DispatchTable {
    /// The full method set this server speaks.
    #[must_use]
    pub fn standard() -> Self {
        let mut requests: HashMap<&'static str, RequestHandler> = HashMap::new();
        requests.insert("initialize", lifecycle::initialize);
        requests.insert("shutdown", lifecycle::shutdown);
        requests.insert("textDocument/completion", intel::completion);
        requests.insert("textDocument/hover", intel::hover);
        requests.insert("textDocument/signatureHelp", intel::signature_help);

        let mut notifications: HashMap<&'static str, NotificationHandler> = HashMap::new();
        notifications.insert("initialized", lifecycle::initialized);
        notifications.insert("exit", lifecycle::exit);
        notifications.insert("textDocument/didOpen", documents::did_open);
        notifications.insert("textDocument/didChange", documents::did_change);
        notifications.insert("textDocument/didSave", documents::did_save);
        notifications.insert("textDocument/didClose", documents::did_close);

        Self {
            requests,
            notifications,
        }
    }

    /// Routes a request. Always returns exactly one response carrying the
    /// request's id, whatever the handler did.
    pub fn handle_request(&self, ctx: &mut Ctx, request: RequestMessage) -> ResponseMessage {
        let Some(handler) = self.requests.get(request.method.as_str()) else {
            warn!(method = %request.method, "request for unregistered method");
            return ResponseMessage::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("method not found: {}", request.method),
            );
        };

        debug!(method = %request.method, "handling request");
        match handler(ctx, &request.params) {
            Ok(result) => ResponseMessage::success(request.id, result),
            Err(e) => {
                error!(method = %request.method, "request handler failed: {e:#}");
                ResponseMessage::error(
                    request.id,
                    INTERNAL_ERROR,
                    format!("{} failed: {e:#}", request.method),
                )
            }
        }
    }

    /// Routes a notification. Failures are logged; the peer never sees them.
    pub fn handle_notification(&self, ctx: &mut Ctx, notification: NotificationMessage) {
        let Some(handler) = self.notifications.get(notification.method.as_str()) else {
            debug!(method = %notification.method, "ignoring unregistered notification");
            return;
        };

        debug!(method = %notification.method, "handling notification");
        if let Err(e) = handler(ctx, &notification.params) {
            warn!(method = %notification.method, "notification handler failed: {e:#}");
        }
    }
}
