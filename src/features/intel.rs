// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Completion, hover, and signature-help request handlers.
//!
//! All three answer from the signature index. Positions are treated as
//! character offsets into the line; for the ASCII-heavy code this backend
//! targets, that coincides with the client's UTF-16 columns.

use anyhow::Context as _;
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionParams, Hover, HoverContents, HoverParams,
    MarkedString, SignatureHelp, SignatureHelpParams, SignatureInformation,
};

use crate::dispatch::Ctx;

/// `textDocument/completion`: prefix-match over indexed names.
pub fn completion(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let params: CompletionParams =
        serde_json::from_value(params.clone()).context("invalid completion params")?;
    let pos = &params.text_document_position;
    let uri = pos.text_document.uri.as_str();

    let prefix = ctx
        .workspace
        .document_text(uri)
        .and_then(|text| word_before(text, pos.position.line, pos.position.character))
        .unwrap_or_default();

    let items: Vec<CompletionItem> = ctx
        .workspace
        .complete(&prefix)
        .into_iter()
        .map(|entry| CompletionItem {
            label: entry.name.clone(),
            kind: Some(CompletionItemKind::FUNCTION),
            detail: Some(entry.signature.clone()),
            ..Default::default()
        })
        .collect();

    Ok(serde_json::to_value(items)?)
}

/// `textDocument/hover`: the signature of the word under the cursor, or
/// `null` when nothing is known about it.
pub fn hover(ctx: &mut Ctx, params: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let params: HoverParams =
        serde_json::from_value(params.clone()).context("invalid hover params")?;
    let pos = &params.text_document_position_params;
    let uri = pos.text_document.uri.as_str();

    let Some(word) = ctx
        .workspace
        .document_text(uri)
        .and_then(|text| word_at(text, pos.position.line, pos.position.character))
    else {
        return Ok(serde_json::Value::Null);
    };

    match ctx.workspace.lookup(&word, None) {
        Some(signature) => {
            let hover = Hover {
                contents: HoverContents::Scalar(MarkedString::String(signature.to_string())),
                range: None,
            };
            Ok(serde_json::to_value(hover)?)
        }
        None => Ok(serde_json::Value::Null),
    }
}

/// `textDocument/signatureHelp`: finds the enclosing call on the current
/// line and reports its signature with the active parameter.
pub fn signature_help(
    ctx: &mut Ctx,
    params: &serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let params: SignatureHelpParams =
        serde_json::from_value(params.clone()).context("invalid signatureHelp params")?;
    let pos = &params.text_document_position_params;
    let uri = pos.text_document.uri.as_str();

    let Some((callee, active_param)) = ctx
        .workspace
        .document_text(uri)
        .and_then(|text| call_context(text, pos.position.line, pos.position.character))
    else {
        return Ok(serde_json::Value::Null);
    };

    let Some(signature) = ctx.workspace.lookup(&callee, None) else {
        return Ok(serde_json::Value::Null);
    };

    let help = SignatureHelp {
        signatures: vec![SignatureInformation {
            label: signature.to_string(),
            documentation: None,
            parameters: None,
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(active_param),
    };
    Ok(serde_json::to_value(help)?)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn line_at(text: &str, line: u32) -> Option<&str> {
    text.lines().nth(line as usize)
}

/// The partial identifier ending at the cursor, for completion.
fn word_before(text: &str, line: u32, character: u32) -> Option<String> {
    let line = line_at(text, line)?;
    let upto: String = line.chars().take(character as usize).collect();
    let start = upto
        .rfind(|c: char| !is_word_char(c))
        .map_or(0, |i| i + upto[i..].chars().next().map_or(1, char::len_utf8));
    Some(upto[start..].to_string())
}

/// The whole identifier covering the cursor, for hover.
fn word_at(text: &str, line: u32, character: u32) -> Option<String> {
    let line = line_at(text, line)?;
    let chars: Vec<char> = line.chars().collect();
    let idx = (character as usize).min(chars.len().saturating_sub(1));
    if chars.is_empty() || !is_word_char(chars[idx]) {
        return None;
    }

    let mut start = idx;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = idx;
    while end + 1 < chars.len() && is_word_char(chars[end + 1]) {
        end += 1;
    }
    Some(chars[start..=end].iter().collect())
}

/// Walks backwards from the cursor to the unmatched `(`, returning the
/// callee name and how many top-level commas the cursor sits past.
fn call_context(text: &str, line: u32, character: u32) -> Option<(String, u32)> {
    let line = line_at(text, line)?;
    let chars: Vec<char> = line.chars().take(character as usize).collect();

    let mut depth = 0u32;
    let mut commas = 0u32;
    let mut open = None;
    for (i, &c) in chars.iter().enumerate().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth > 0 => depth -= 1,
            '(' => {
                open = Some(i);
                break;
            }
            ',' if depth == 0 => commas += 1,
            _ => {}
        }
    }

    let open = open?;
    let mut start = open;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    if start == open {
        return None;
    }
    let callee: String = chars[start..open].iter().collect();
    Some((callee, commas))
}
