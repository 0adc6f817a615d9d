// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Language-intelligence feature handlers and their workspace backend.
//!
//! The protocol engine only routes to these; the semantics live here so
//! the engine stays feature-agnostic.

/// Document lifecycle notification handlers.
pub mod documents;
/// Completion, hover, and signature-help request handlers.
pub mod intel;
/// Document store and signature index.
pub mod workspace;
