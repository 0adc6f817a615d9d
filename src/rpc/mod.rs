// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! JSON-RPC wire protocol: message shapes, Content-Length framing, and
//! the incoming-message classifier.

/// Classification of parsed payloads into protocol messages.
pub mod codec;
/// Message structs, error codes, and the frame parser.
pub mod protocol;

use thiserror::Error;

/// Faults that terminate the protocol engine.
///
/// Everything else (parse failures, unknown methods, handler errors) is
/// contained by the dispatcher and never reaches the event loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed header block or length declaration. Unrecoverable: the
    /// stream position is lost mid-frame.
    #[error("framing error: {0}")]
    Framing(String),

    /// The peer closed the connection (or the reader task died).
    #[error("transport closed by peer")]
    Closed,

    /// An I/O error on the underlying stream.
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),
}
