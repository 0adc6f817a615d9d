// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Signet is a small language server: Content-Length framed JSON-RPC over
//! stdio or TCP, a cooperative single-task event loop, and a
//! signature-database backend answering completion, hover, and signature
//! help.
//!
//! The protocol engine (framing, classification, dispatch, queues,
//! lifecycle) is feature-agnostic; the feature handlers under
//! [`features`] are the worked example it routes to.

/// Layered runtime configuration.
pub mod config;
/// Method dispatch tables and handler failure containment.
pub mod dispatch;
/// Feature handlers and their workspace backend.
pub mod features;
/// Lifecycle method handlers (initialize through exit).
pub mod lifecycle;
/// FIFO and coalescing queues.
pub mod queue;
/// JSON-RPC message shapes, framing, and classification.
pub mod rpc;
/// The event-loop engine.
pub mod server;
/// Lifecycle state and the parent-liveness probe.
pub mod state;
/// Rate gate for coalesced work.
pub mod throttle;
/// Framed transport over stdio or TCP.
pub mod transport;
