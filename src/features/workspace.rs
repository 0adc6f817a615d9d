// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Document store and signature index.
//!
//! Documents are full-sync text keyed by URI string. The signature index
//! maps function names (optionally qualified by a container such as a
//! class) to a one-line textual signature. It is fed from two sources:
//! builtin entries from the config, installed once the handshake
//! completes, and a light line-scanning extractor run over open documents
//! by the coalesced reindex pass.

use std::collections::HashMap;

use tracing::debug;

/// One open document, full-sync text.
#[derive(Debug)]
pub struct Document {
    /// Latest full text.
    pub text: String,
    /// Client-reported version, monotonically increasing per document.
    pub version: i32,
}

/// One indexed signature.
#[derive(Debug, Clone)]
pub struct SignatureEntry {
    /// Bare function name.
    pub name: String,
    /// Enclosing class/impl, when the definition is nested.
    pub container: Option<String>,
    /// One-line textual signature shown in hover/signature help.
    pub signature: String,
    /// Source document, `None` for builtins.
    pub uri: Option<String>,
}

/// The workspace collaborator handlers read and mutate.
#[derive(Debug)]
pub struct Workspace {
    documents: HashMap<String, Document>,
    index: Vec<SignatureEntry>,
    builtins: HashMap<String, String>,
    builtins_installed: bool,
}

impl Workspace {
    /// Creates an empty workspace. `builtins` stay dormant until
    /// [`Workspace::install_builtins`] runs at handshake completion.
    #[must_use]
    pub fn new(builtins: HashMap<String, String>) -> Self {
        Self {
            documents: HashMap::new(),
            index: Vec::new(),
            builtins,
            builtins_installed: false,
        }
    }

    /// Installs the configured builtin signatures. Returns how many were
    /// added; repeated calls are no-ops.
    pub fn install_builtins(&mut self) -> usize {
        if self.builtins_installed {
            return 0;
        }
        self.builtins_installed = true;
        let mut names: Vec<_> = self.builtins.keys().cloned().collect();
        names.sort();
        for name in &names {
            self.index.push(SignatureEntry {
                name: name.clone(),
                container: None,
                signature: self.builtins[name].clone(),
                uri: None,
            });
        }
        names.len()
    }

    /// Inserts or replaces a document's full text.
    pub fn open_document(&mut self, uri: impl Into<String>, text: String, version: i32) {
        self.documents.insert(uri.into(), Document { text, version });
    }

    /// Replaces a document's text (full-sync change). Unknown URIs are
    /// inserted; an editor restart can reorder didOpen/didChange.
    pub fn update_document(&mut self, uri: &str, text: String, version: i32) {
        match self.documents.get_mut(uri) {
            Some(doc) => {
                doc.text = text;
                doc.version = version;
            }
            None => self.open_document(uri, text, version),
        }
    }

    /// Replaces a document's text on save, preserving the tracked version
    /// (save notifications carry none). Unknown URIs are inserted at
    /// version 0.
    pub fn save_document(&mut self, uri: &str, text: String) {
        match self.documents.get_mut(uri) {
            Some(doc) => doc.text = text,
            None => self.open_document(uri, text, 0),
        }
    }

    /// Client-reported version of an open document.
    #[must_use]
    pub fn document_version(&self, uri: &str) -> Option<i32> {
        self.documents.get(uri).map(|d| d.version)
    }

    /// Removes a document and its indexed signatures.
    pub fn close_document(&mut self, uri: &str) {
        self.documents.remove(uri);
        self.index.retain(|e| e.uri.as_deref() != Some(uri));
    }

    /// Borrowed document text, when open.
    #[must_use]
    pub fn document_text(&self, uri: &str) -> Option<&str> {
        self.documents.get(uri).map(|d| d.text.as_str())
    }

    /// Re-extracts signatures from one document. Returns the number of
    /// entries now indexed for it. A URI with no open document (closed
    /// while queued) indexes nothing.
    pub fn reindex(&mut self, uri: &str) -> usize {
        self.index.retain(|e| e.uri.as_deref() != Some(uri));
        let Some(doc) = self.documents.get(uri) else {
            return 0;
        };
        let mut entries = extract_signatures(uri, &doc.text);
        let count = entries.len();
        debug!(uri, count, "reindexed document");
        self.index.append(&mut entries);
        count
    }

    /// Looks up a signature by name, optionally qualified by container.
    ///
    /// With a container, a qualified match wins over an unqualified one;
    /// without, the first entry under the name wins.
    #[must_use]
    pub fn lookup(&self, name: &str, container: Option<&str>) -> Option<&str> {
        if let Some(container) = container
            && let Some(entry) = self
                .index
                .iter()
                .find(|e| e.name == name && e.container.as_deref() == Some(container))
        {
            return Some(&entry.signature);
        }
        self.index
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.signature.as_str())
    }

    /// All indexed entries whose name starts with `prefix`.
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Vec<&SignatureEntry> {
        self.index
            .iter()
            .filter(|e| e.name.starts_with(prefix))
            .collect()
    }
}

/// Scans document text for function heads.
///
/// Recognizes `def name(...)`, `fn name(...)`, and `function name(...)`
/// lines; a preceding `class`/`impl` line becomes the container for
/// indented definitions. Deliberately shallow — this backend is a worked
/// example, not a parser.
fn extract_signatures(uri: &str, text: &str) -> Vec<SignatureEntry> {
    let mut entries = Vec::new();
    let mut container: Option<String> = None;

    for line in text.lines() {
        let indented = line.starts_with(char::is_whitespace);
        let trimmed = line.trim();

        if let Some(name) = container_name(trimmed) {
            container = Some(name);
            continue;
        }

        let Some(head) = function_head(trimmed) else {
            // A non-indented statement ends the current container's body.
            if !indented && !trimmed.is_empty() {
                container = None;
            }
            continue;
        };

        entries.push(SignatureEntry {
            name: head.0,
            container: if indented { container.clone() } else { None },
            signature: head.1,
            uri: Some(uri.to_string()),
        });
    }

    entries
}

/// `class Foo:` / `impl Foo {` → `Foo`.
fn container_name(line: &str) -> Option<String> {
    let rest = line
        .strip_prefix("class ")
        .or_else(|| line.strip_prefix("impl "))?;
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() { None } else { Some(name) }
}

/// `def name(args) ...` → (`name`, `name(args)`).
fn function_head(line: &str) -> Option<(String, String)> {
    let rest = line
        .strip_prefix("def ")
        .or_else(|| line.strip_prefix("fn "))
        .or_else(|| line.strip_prefix("pub fn "))
        .or_else(|| line.strip_prefix("function "))?;

    let open = rest.find('(')?;
    let name = rest[..open].trim().to_string();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let close = rest.find(')')?;
    let signature = format!("{}{}", &rest[..open], &rest[open..=close]);
    Some((name, signature))
}
