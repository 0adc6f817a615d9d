// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! End-to-end engine tests over an in-memory duplex transport.
//!
//! A test client speaks framed JSON-RPC to a running engine exactly the
//! way an editor would, and the engine's task is joined to observe
//! termination.

use std::collections::HashMap;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use signet_lsp::features::workspace::Workspace;
use signet_lsp::rpc::ProtocolError;
use signet_lsp::rpc::protocol::try_parse_frame;
use signet_lsp::server::{Engine, EngineOptions};
use signet_lsp::state::TransportKind;
use signet_lsp::transport::FramedTransport;

/// Editor-side test client plus the running engine task.
struct Harness {
    writer: WriteHalf<tokio::io::DuplexStream>,
    reader: ReadHalf<tokio::io::DuplexStream>,
    buffer: BytesMut,
    engine: JoinHandle<(Result<(), ProtocolError>, bool)>,
}

impl Harness {
    fn start() -> Self {
        Self::start_with(Workspace::new(HashMap::new()))
    }

    fn start_with(workspace: Workspace) -> Self {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);

        let transport = FramedTransport::new(server_read, server_write);
        let options = EngineOptions {
            throttle: Duration::from_millis(30),
            poll: Duration::from_millis(2),
            parent_poll: Duration::from_millis(60_000),
        };
        let mut engine = Engine::new(transport, TransportKind::Stdio, workspace, options);

        let engine = tokio::spawn(async move {
            let result = engine.run().await;
            (result, engine.shutdown_was_clean())
        });

        Self {
            writer,
            reader,
            buffer: BytesMut::new(),
            engine,
        }
    }

    async fn send(&mut self, message: serde_json::Value) {
        let body = message.to_string();
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer.write_all(framed.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Sends raw bytes, bypassing framing.
    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Reads the next message of any kind, with a deadline.
    async fn recv(&mut self) -> serde_json::Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(payload) = try_parse_frame(&mut self.buffer).unwrap() {
                return serde_json::from_str(&payload).unwrap();
            }
            let mut chunk = [0u8; 4096];
            let read = tokio::time::timeout_at(deadline, self.reader.read(&mut chunk))
                .await
                .expect("timed out waiting for a message")
                .unwrap();
            assert!(read > 0, "engine closed the connection unexpectedly");
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Reads until the response with the given id, skipping notifications.
    async fn recv_response(&mut self, id: i64) -> serde_json::Value {
        loop {
            let message = self.recv().await;
            if message.get("id") == Some(&serde_json::json!(id)) {
                return message;
            }
            assert!(
                message.get("method").is_some(),
                "unexpected non-notification while waiting for id {id}: {message}"
            );
        }
    }

    async fn initialize(&mut self) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {"processId": null, "capabilities": {}},
        }))
        .await;
        let response = self.recv_response(1).await;
        assert!(response["result"]["capabilities"].is_object());
        self.send(serde_json::json!({
            "jsonrpc": "2.0", "method": "initialized", "params": {}
        }))
        .await;
    }

    async fn join(self) -> (Result<(), ProtocolError>, bool) {
        tokio::time::timeout(Duration::from_secs(5), self.engine)
            .await
            .expect("engine did not terminate")
            .unwrap()
    }
}

fn open_notification(uri: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0", "method": "textDocument/didOpen",
        "params": {"textDocument": {
            "uri": uri, "languageId": "python", "version": 1, "text": text,
        }},
    })
}

#[tokio::test]
async fn initialize_reports_capabilities_and_identity() {
    let mut h = Harness::start();
    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize",
        "params": {"processId": null, "capabilities": {}},
    }))
    .await;

    let response = h.recv_response(1).await;
    assert_eq!(response["jsonrpc"], "2.0");
    let result = &response["result"];
    assert_eq!(result["serverInfo"]["name"], "signet-ls");
    assert_eq!(result["capabilities"]["hoverProvider"], true);
    assert!(result["capabilities"]["completionProvider"].is_object());
}

#[tokio::test]
async fn unknown_request_method_gets_method_not_found() {
    let mut h = Harness::start();
    h.initialize().await;

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 7, "method": "textDocument/foo", "params": {},
    }))
    .await;

    let response = h.recv_response(7).await;
    assert_eq!(response["error"]["code"], -32601);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("textDocument/foo")
    );
}

#[tokio::test]
async fn unknown_notification_is_survivable() {
    let mut h = Harness::start();
    h.initialize().await;

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "method": "workspace/unheardOf", "params": {},
    }))
    .await;

    // The engine keeps serving requests afterwards.
    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 2, "method": "shutdown", "params": null,
    }))
    .await;
    let response = h.recv_response(2).await;
    assert!(response["error"].is_null());
}

#[tokio::test]
async fn failing_handler_still_answers_with_internal_error() {
    let mut h = Harness::start();

    // Array params cannot deserialize into initialize params.
    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 3, "method": "initialize", "params": [1, 2, 3],
    }))
    .await;

    let response = h.recv_response(3).await;
    assert_eq!(response["error"]["code"], -32603);
}

#[tokio::test]
async fn chunked_payload_dispatches_once() {
    let mut h = Harness::start();

    let body = serde_json::json!({
        "jsonrpc": "2.0", "id": 9, "method": "shutdown", "params": null,
    })
    .to_string();
    let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
    let bytes = framed.as_bytes().to_vec();

    // Drip the frame through in three pieces with pauses.
    let third = bytes.len() / 3;
    for part in [
        &bytes[..third],
        &bytes[third..2 * third],
        &bytes[2 * third..],
    ] {
        h.send_raw(part).await;
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    let response = h.recv_response(9).await;
    assert!(response["result"].is_null());
    assert!(response["error"].is_null());
}

#[tokio::test]
async fn malformed_header_terminates_the_loop() {
    let mut h = Harness::start();
    h.send_raw(b"Content-Length: abc\r\n\r\n{}").await;

    let (result, clean) = h.join().await;
    assert!(matches!(result, Err(ProtocolError::Framing(_))));
    assert!(!clean);
}

#[tokio::test]
async fn shutdown_then_exit_terminates_cleanly() {
    let mut h = Harness::start();
    h.initialize().await;

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 2, "method": "shutdown", "params": null,
    }))
    .await;
    let response = h.recv_response(2).await;
    assert!(response["error"].is_null());

    h.send(serde_json::json!({"jsonrpc": "2.0", "method": "exit"}))
        .await;

    let (result, clean) = h.join().await;
    assert!(result.is_ok());
    assert!(clean);
}

#[tokio::test]
async fn peer_disconnect_terminates_without_error() {
    let h = Harness::start();
    drop((h.writer, h.reader));

    let (result, clean) = tokio::time::timeout(Duration::from_secs(5), h.engine)
        .await
        .expect("engine did not terminate")
        .unwrap();
    assert!(result.is_ok());
    assert!(!clean);
}

#[tokio::test]
async fn edits_coalesce_into_indexed_completions() {
    let mut h = Harness::start();
    h.initialize().await;

    h.send(open_notification("file:///a.py", "def alpha(x):\n    pass\n"))
        .await;
    // A quick burst of edits; only the last text should be indexed.
    for (version, text) in [(2, "def beta(x):\n"), (3, "def gamma(y, z):\n    pass\n")] {
        h.send(serde_json::json!({
            "jsonrpc": "2.0", "method": "textDocument/didChange",
            "params": {
                "textDocument": {"uri": "file:///a.py", "version": version},
                "contentChanges": [{"text": text}],
            },
        }))
        .await;
    }

    // The reindex pass announces itself through the reply queue.
    let log = h.recv().await;
    assert_eq!(log["method"], "window/logMessage");
    assert!(
        log["params"]["message"]
            .as_str()
            .unwrap()
            .contains("file:///a.py")
    );

    // Let the throttle interval lapse so the final burst state is indexed.
    tokio::time::sleep(Duration::from_millis(120)).await;

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 4, "method": "textDocument/completion",
        "params": {
            "textDocument": {"uri": "file:///a.py"},
            "position": {"line": 0, "character": 0},
        },
    }))
    .await;

    let response = h.recv_response(4).await;
    let items = response["result"].as_array().unwrap().clone();
    let labels: Vec<&str> = items.iter().map(|i| i["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["gamma"]);
    assert_eq!(items[0]["detail"], "gamma(y, z)");
}

#[tokio::test]
async fn hover_and_signature_help_answer_from_builtins() {
    let workspace = Workspace::new(HashMap::from([(
        "len".to_string(),
        "len(sequence)".to_string(),
    )]));
    let mut h = Harness::start_with(workspace);
    h.initialize().await;

    h.send(open_notification("file:///b.py", "len(items)\nlen(a, \n"))
        .await;

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 5, "method": "textDocument/hover",
        "params": {
            "textDocument": {"uri": "file:///b.py"},
            "position": {"line": 0, "character": 1},
        },
    }))
    .await;
    let hover = h.recv_response(5).await;
    assert_eq!(hover["result"]["contents"], "len(sequence)");

    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": 6, "method": "textDocument/signatureHelp",
        "params": {
            "textDocument": {"uri": "file:///b.py"},
            "position": {"line": 1, "character": 7},
        },
    }))
    .await;
    let help = h.recv_response(6).await;
    assert_eq!(help["result"]["signatures"][0]["label"], "len(sequence)");
    assert_eq!(help["result"]["activeParameter"], 1);
}

#[tokio::test]
async fn requests_with_string_ids_are_echoed() {
    let mut h = Harness::start();
    h.send(serde_json::json!({
        "jsonrpc": "2.0", "id": "init-1", "method": "initialize",
        "params": {"processId": null, "capabilities": {}},
    }))
    .await;

    let response = h.recv().await;
    assert_eq!(response["id"], "init-1");
    assert!(response["result"].is_object());
}
