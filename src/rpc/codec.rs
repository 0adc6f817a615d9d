// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Classifies parsed payloads into protocol messages and serializes
//! outgoing ones.
//!
//! Classification rules: a `method` field plus an `id` field is a request;
//! `method` without `id` is a notification; `id` without `method` is a
//! reply to a server-initiated request. Anything else has no partner id to
//! answer, so it is reported as unclassifiable and dropped by the caller.

use serde::Serialize;

use super::protocol::{NotificationMessage, RequestMessage, ResponseMessage};

/// An incoming message, classified by shape.
#[derive(Debug)]
pub enum Incoming {
    /// A request demanding exactly one response.
    Request(RequestMessage),
    /// A notification; never answered.
    Notification(NotificationMessage),
    /// A response to a request this server sent. The engine sends none, so
    /// these are logged and dropped.
    Reply(ResponseMessage),
}

/// Classifies a raw payload.
///
/// # Errors
///
/// Returns the underlying serde error when the payload is not valid JSON
/// or matches none of the three message shapes.
pub fn classify(payload: &str) -> Result<Incoming, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(payload)?;

    let has_method = value.get("method").is_some();
    let has_id = value.get("id").is_some();

    if has_method && has_id {
        return Ok(Incoming::Request(serde_json::from_value(value)?));
    }
    if has_method {
        return Ok(Incoming::Notification(serde_json::from_value(value)?));
    }
    if has_id {
        return Ok(Incoming::Reply(serde_json::from_value(value)?));
    }

    // Force a structured error through the request deserializer.
    serde_json::from_value::<RequestMessage>(value).map(Incoming::Request)
}

/// Serializes an outgoing response or notification to wire text.
///
/// # Errors
///
/// Returns the underlying serde error; in practice these shapes always
/// serialize.
pub fn serialize<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
