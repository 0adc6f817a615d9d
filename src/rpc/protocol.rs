// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! JSON-RPC message shapes and the Content-Length frame parser.
//!
//! The wire format is the LSP dialect: a header block of
//! `Content-Length: <decimal>` lines terminated by `\r\n\r\n`, followed by
//! exactly that many bytes of JSON payload.

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// JSON-RPC "parse error" code.
pub const PARSE_ERROR: i64 = -32700;
/// JSON-RPC "invalid request" code.
pub const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC "method not found" code.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC "invalid params" code.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC "internal error" code.
pub const INTERNAL_ERROR: i64 = -32603;

/// Upper bound on a declared payload length. A header above this is treated
/// as a framing fault rather than an allocation request.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

fn default_null() -> serde_json::Value {
    serde_json::Value::Null
}

/// A JSON-RPC request: carries an id and demands exactly one response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RequestMessage {
    /// Protocol version marker, always "2.0".
    pub jsonrpc: String,
    /// Request id, echoed in the response.
    pub id: RequestId,
    /// Method name, e.g. `textDocument/hover`.
    pub method: String,
    /// Method parameters; `null` when absent.
    #[serde(default = "default_null")]
    pub params: serde_json::Value,
}

/// A JSON-RPC notification: no id, never answered.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationMessage {
    /// Protocol version marker, always "2.0".
    pub jsonrpc: String,
    /// Method name, e.g. `textDocument/didChange`.
    pub method: String,
    /// Method parameters; `null` when absent.
    #[serde(default = "default_null")]
    pub params: serde_json::Value,
}

/// A JSON-RPC response: either `result` or `error`, never both.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseMessage {
    /// Protocol version marker, always "2.0".
    pub jsonrpc: String,
    /// Id of the originating request.
    pub id: Option<RequestId>,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ResponseMessage {
    /// Builds a success response carrying `result`.
    #[must_use]
    pub fn success(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response with the given code and message.
    #[must_use]
    pub fn error(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Request id: the protocol permits numbers and strings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id.
    Number(i64),
    /// String id.
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// JSON-RPC error object inside a response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseError {
    /// One of the `-327xx` protocol codes.
    pub code: i64,
    /// Human-readable description.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Extracts one complete framed payload from `buffer`, if present.
///
/// Returns `Ok(None)` when the buffer does not yet hold a full header block
/// plus payload; the caller keeps accumulating bytes and retries. Consumed
/// bytes are removed from the buffer, so repeated calls walk through
/// back-to-back frames.
///
/// # Errors
///
/// `ProtocolError::Framing` when a header line is anything other than a
/// well-formed `Content-Length` declaration, when the declared length is
/// absurd, or when the payload is not UTF-8. Framing faults are fatal: the
/// stream position is unrecoverable.
pub fn try_parse_frame(buffer: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
    let Some(headers_end) = find_headers_end(buffer) else {
        return Ok(None);
    };

    let headers = std::str::from_utf8(&buffer[..headers_end - 4])
        .map_err(|_| ProtocolError::Framing("header block is not UTF-8".to_string()))?;

    let content_length = parse_headers(headers)?;

    if content_length > MAX_FRAME_BYTES {
        return Err(ProtocolError::Framing(format!(
            "declared length {content_length} exceeds the {MAX_FRAME_BYTES} byte limit"
        )));
    }

    let total_len = headers_end + content_length;
    if buffer.len() < total_len {
        // Header complete, payload still arriving in chunks.
        return Ok(None);
    }

    buffer.advance(headers_end);
    let payload = buffer.split_to(content_length);
    let message = String::from_utf8(payload.to_vec())
        .map_err(|_| ProtocolError::Framing("payload is not UTF-8".to_string()))?;
    Ok(Some(message))
}

/// Scans for the `\r\n\r\n` header terminator; returns the offset just past it.
fn find_headers_end(buffer: &BytesMut) -> Option<usize> {
    (0..buffer.len().saturating_sub(3)).find_map(|i| {
        if &buffer[i..i + 4] == b"\r\n\r\n" {
            Some(i + 4)
        } else {
            None
        }
    })
}

/// Validates the header block and returns the declared content length.
///
/// This dialect admits exactly one header: every non-empty line must be a
/// `Content-Length` declaration (name matched case-insensitively).
fn parse_headers(headers: &str) -> Result<usize, ProtocolError> {
    let mut content_length = None;

    for line in headers.lines() {
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(ProtocolError::Framing(format!(
                "malformed header line: {line:?}"
            )));
        };
        if !name.trim().eq_ignore_ascii_case("content-length") {
            return Err(ProtocolError::Framing(format!(
                "unexpected header: {line:?}"
            )));
        }
        let parsed = value.trim().parse::<usize>().map_err(|_| {
            ProtocolError::Framing(format!("invalid Content-Length value: {:?}", value.trim()))
        })?;
        content_length = Some(parsed);
    }

    content_length
        .ok_or_else(|| ProtocolError::Framing("missing Content-Length header".to_string()))
}
