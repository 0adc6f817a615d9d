// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Server lifecycle state.
//!
//! One [`ServerState`] exists per process, owned by the engine and handed
//! to every handler. Only the lifecycle handlers (initialize, initialized,
//! shutdown, exit) mutate the phase; the dispatcher itself is
//! state-agnostic, so out-of-phase calls are a handler policy question.

use serde::Serialize;

/// Which transport the process was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Standard input/output pair.
    Stdio,
    /// A single TCP connection.
    Tcp,
}

/// Lifecycle phase of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    /// Process started, no initialize seen yet.
    Uninitialized,
    /// `initialize` answered, waiting for the `initialized` notification.
    Initializing,
    /// Handshake complete; normal operation.
    Initialized,
    /// `shutdown` acknowledged; waiting for `exit`.
    ShuttingDown,
}

/// Process-wide mutable server state.
#[derive(Debug)]
pub struct ServerState {
    /// Transport selected at startup.
    pub transport: TransportKind,
    /// Current lifecycle phase.
    pub phase: LifecyclePhase,
    /// Set by `exit` (or defensively on transport loss / parent death);
    /// observed by the event loop at the top of each tick.
    pub exiting: bool,
    /// The client's process id from `initialize`, used for orphan detection.
    pub process_id: Option<i64>,
    /// Workspace root as a URI, when the client sent one.
    pub root_uri: Option<String>,
    /// Workspace root as a filesystem path, when the client sent one.
    pub root_path: Option<String>,
    /// Opaque options forwarded by the client at initialize.
    pub initialization_options: serde_json::Value,
    /// Capabilities the client declared.
    pub client_capabilities: serde_json::Value,
}

impl ServerState {
    /// Fresh state for a just-started process.
    #[must_use]
    pub const fn new(transport: TransportKind) -> Self {
        Self {
            transport,
            phase: LifecyclePhase::Uninitialized,
            exiting: false,
            process_id: None,
            root_uri: None,
            root_path: None,
            initialization_options: serde_json::Value::Null,
            client_capabilities: serde_json::Value::Null,
        }
    }

    /// Requests loop termination. Idempotent.
    pub fn request_exit(&mut self) {
        self.exiting = true;
    }

    /// Whether the client process that initialized us is still running.
    ///
    /// Editors are expected to send `exit`, but a crashed editor leaves the
    /// server orphaned; the event loop polls this and shuts down on its
    /// own. Without a recorded process id (or off Linux) the check always
    /// passes.
    #[must_use]
    pub fn parent_alive(&self) -> bool {
        match self.process_id {
            Some(pid) if pid > 0 => process_exists(pid),
            _ => true,
        }
    }
}

#[cfg(target_os = "linux")]
fn process_exists(pid: i64) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(target_os = "linux"))]
fn process_exists(_pid: i64) -> bool {
    true
}
