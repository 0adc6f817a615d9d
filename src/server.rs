// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! The engine: one cooperative event loop driving the whole server.
//!
//! Each tick, in order: observe exit conditions (exit flag, dead parent,
//! closed transport), fire the change throttle and run the reindex pass
//! over the coalesced document queue, flush the reply queue FIFO, then
//! attempt one non-blocking read — dispatching a message if one arrived,
//! sleeping briefly if not. No handler runs outside a tick, so the state
//! holders need no locks.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::dispatch::{Ctx, DispatchTable};
use crate::features::workspace::Workspace;
use crate::queue::{NamedQueue, Queue};
use crate::rpc::codec::{self, Incoming};
use crate::rpc::protocol::NotificationMessage;
use crate::rpc::ProtocolError;
use crate::state::{LifecyclePhase, ServerState, TransportKind};
use crate::throttle::Throttle;
use crate::transport::{FramedTransport, ReadOutcome};

/// Timing knobs for the event loop.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Minimum interval between reindex passes.
    pub throttle: Duration,
    /// Backoff sleep when no input is ready.
    pub poll: Duration,
    /// How often to probe whether the parent process is still alive.
    pub parent_poll: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(200),
            poll: Duration::from_millis(10),
            parent_poll: Duration::from_millis(2000),
        }
    }
}

/// The protocol engine. Owns every process-wide mutable resource.
pub struct Engine {
    transport: FramedTransport,
    dispatch: DispatchTable,
    state: ServerState,
    workspace: Workspace,
    changes: NamedQueue<String>,
    change_throttle: Throttle,
    replies: Queue<NotificationMessage>,
    options: EngineOptions,
    last_parent_probe: Instant,
}

impl Engine {
    /// Assembles an engine around a connected transport.
    #[must_use]
    pub fn new(
        transport: FramedTransport,
        kind: TransportKind,
        workspace: Workspace,
        options: EngineOptions,
    ) -> Self {
        Self {
            transport,
            dispatch: DispatchTable::standard(),
            state: ServerState::new(kind),
            workspace,
            changes: NamedQueue::new(),
            change_throttle: Throttle::new(options.throttle),
            replies: Queue::new(),
            options,
            last_parent_probe: Instant::now(),
        }
    }

    /// True when the peer completed the shutdown handshake before exiting.
    /// Drives the process exit code.
    #[must_use]
    pub fn shutdown_was_clean(&self) -> bool {
        self.state.phase == LifecyclePhase::ShuttingDown
    }

    /// Runs the event loop until an exit condition holds.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Framing` on a malformed header block — the stream
    /// position is lost, so the loop cannot recover mid-frame. Peer
    /// closure and write failures are graceful terminations, not errors.
    pub async fn run(&mut self) -> Result<(), ProtocolError> {
        info!(transport = ?self.state.transport, "engine starting");

        loop {
            if self.state.exiting {
                info!("exit flag observed, terminating");
                break;
            }

            self.probe_parent();

            if self.change_throttle.fire(Instant::now()) {
                self.reindex_pass();
            }

            if let Err(e) = self.flush_replies().await {
                self.note_write_failure(&e);
                continue;
            }

            match self.transport.poll_message() {
                Ok(ReadOutcome::Payload(payload)) => {
                    if let Err(e) = self.dispatch_payload(&payload).await {
                        self.note_write_failure(&e);
                    }
                }
                Ok(ReadOutcome::WouldBlock) => {
                    tokio::time::sleep(self.options.poll).await;
                }
                Ok(ReadOutcome::Closed) => {
                    info!("transport closed by peer, terminating");
                    self.state.request_exit();
                }
                Err(e) => {
                    error!("fatal protocol error: {e}");
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Periodic orphan check; a dead parent forces the exit flag.
    fn probe_parent(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_parent_probe) < self.options.parent_poll {
            return;
        }
        self.last_parent_probe = now;
        if !self.state.parent_alive() {
            warn!(
                process_id = ?self.state.process_id,
                "parent process is gone, shutting down"
            );
            self.state.request_exit();
        }
    }

    /// Drains the coalescing queue and reindexes each dirty document,
    /// reporting the result through the reply queue.
    fn reindex_pass(&mut self) {
        for uri in self.changes.drain_all() {
            let count = self.workspace.reindex(&uri);
            self.replies.push(log_message(format!(
                "indexed {count} signatures in {uri}"
            )));
        }
    }

    /// Delivers every queued reply FIFO through the transport.
    async fn flush_replies(&mut self) -> Result<(), ProtocolError> {
        while let Some(notification) = self.replies.pop() {
            match codec::serialize(&notification) {
                Ok(body) => self.transport.write_message(&body).await?,
                Err(e) => warn!("dropping unserializable reply: {e}"),
            }
        }
        Ok(())
    }

    /// Classifies one payload and routes it. Responses to requests go out
    /// synchronously; everything the dispatcher contains stays contained.
    async fn dispatch_payload(&mut self, payload: &str) -> Result<(), ProtocolError> {
        match codec::classify(payload) {
            Ok(Incoming::Request(request)) => {
                let response = {
                    let mut ctx = Ctx {
                        state: &mut self.state,
                        workspace: &mut self.workspace,
                        changes: &mut self.changes,
                        change_throttle: &mut self.change_throttle,
                        replies: &mut self.replies,
                    };
                    self.dispatch.handle_request(&mut ctx, request)
                };
                match codec::serialize(&response) {
                    Ok(body) => self.transport.write_message(&body).await?,
                    Err(e) => error!("failed to serialize response: {e}"),
                }
            }
            Ok(Incoming::Notification(notification)) => {
                let mut ctx = Ctx {
                    state: &mut self.state,
                    workspace: &mut self.workspace,
                    changes: &mut self.changes,
                    change_throttle: &mut self.change_throttle,
                    replies: &mut self.replies,
                };
                self.dispatch.handle_notification(&mut ctx, notification);
            }
            Ok(Incoming::Reply(reply)) => {
                // This engine sends no server→client requests.
                debug!(id = ?reply.id, "dropping unexpected reply");
            }
            Err(e) => {
                // No partner id to answer; log and drop.
                warn!("unclassifiable payload dropped: {e}");
            }
        }
        Ok(())
    }

    /// A failed write means the peer is gone; terminate gracefully rather
    /// than surfacing an error.
    fn note_write_failure(&mut self, e: &ProtocolError) {
        warn!("write failed, assuming peer is gone: {e}");
        self.state.request_exit();
    }
}

/// A `window/logMessage` notification at log level.
fn log_message(message: String) -> NotificationMessage {
    NotificationMessage {
        jsonrpc: "2.0".to_string(),
        method: "window/logMessage".to_string(),
        params: serde_json::json!({"type": 4, "message": message}),
    }
}
