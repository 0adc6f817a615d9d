// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Framed transport over stdio or a single TCP connection.
//!
//! A spawned reader task owns the read half and forwards raw chunks over a
//! bounded channel; the engine drains that channel without ever blocking,
//! accumulates bytes in a [`BytesMut`], and extracts complete
//! Content-Length frames. Writes go straight to the owned write half.
//!
//! The engine is a single cooperative task, so [`FramedTransport::poll_message`]
//! is strictly non-blocking: `WouldBlock` tells the event loop to back off
//! briefly and stay responsive to its other work.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::rpc::ProtocolError;
use crate::rpc::protocol;

/// Chunks in flight between the reader task and the engine.
const READER_CHANNEL_CAPACITY: usize = 64;

/// Read buffer size for one chunk.
const READ_CHUNK_BYTES: usize = 4096;

/// Outcome of one non-blocking read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete payload was assembled.
    Payload(String),
    /// No complete frame available yet; back off and retry next tick.
    WouldBlock,
    /// The peer closed the stream (mid-frame closure included).
    Closed,
}

/// Length-prefixed message transport with a non-blocking read side.
pub struct FramedTransport {
    chunks: mpsc::Receiver<Vec<u8>>,
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    buffer: BytesMut,
    reader_done: bool,
}

impl FramedTransport {
    /// Wraps an arbitrary reader/writer pair, spawning the reader task.
    ///
    /// This is the seam integration tests use with an in-memory duplex.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(READER_CHANNEL_CAPACITY);
        tokio::spawn(reader_task(reader, tx));
        Self {
            chunks: rx,
            writer: Box::new(writer),
            buffer: BytesMut::with_capacity(8192),
            reader_done: false,
        }
    }

    /// Transport over the process's standard input/output pair.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }

    /// Transport over a single TCP connection to `addr` (host:port).
    ///
    /// # Errors
    ///
    /// Returns the connect error from the OS.
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self::new(read_half, write_half))
    }

    /// Attempts to extract one complete message without blocking.
    ///
    /// Drains whatever chunks the reader task has queued, then tries to
    /// parse a frame. Partial frames stay buffered across calls, so a
    /// payload delivered in several chunks with delays in between still
    /// assembles into exactly one message.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Framing` on a malformed header block; fatal.
    pub fn poll_message(&mut self) -> Result<ReadOutcome, ProtocolError> {
        loop {
            if let Some(payload) = protocol::try_parse_frame(&mut self.buffer)? {
                trace!(bytes = payload.len(), "frame assembled");
                return Ok(ReadOutcome::Payload(payload));
            }

            if self.reader_done {
                if !self.buffer.is_empty() {
                    debug!(
                        pending = self.buffer.len(),
                        "peer closed mid-frame; discarding partial data"
                    );
                }
                return Ok(ReadOutcome::Closed);
            }

            match self.chunks.try_recv() {
                Ok(chunk) => self.buffer.extend_from_slice(&chunk),
                Err(mpsc::error::TryRecvError::Empty) => return Ok(ReadOutcome::WouldBlock),
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.reader_done = true;
                }
            }
        }
    }

    /// Writes one framed message: `Content-Length` header, blank line, body.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Io` when the peer is gone.
    pub async fn write_message(&mut self, body: &str) -> Result<(), ProtocolError> {
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        trace!(bytes = body.len(), "writing frame");
        self.writer.write_all(header.as_bytes()).await?;
        self.writer.write_all(body.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Moves raw bytes from the stream into the channel until EOF or error.
async fn reader_task<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) {
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                debug!("input stream closed");
                break;
            }
            Ok(n) => {
                if tx.send(chunk[..n].to_vec()).await.is_err() {
                    // Engine dropped the transport.
                    break;
                }
            }
            Err(e) => {
                warn!("read error on transport: {e}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Polls until a payload, closure, or the deadline. Backoff mirrors the
    /// event loop's sleep-and-retry discipline.
    async fn poll_until(transport: &mut FramedTransport) -> Result<ReadOutcome, ProtocolError> {
        for _ in 0..500 {
            match transport.poll_message()? {
                ReadOutcome::WouldBlock => tokio::time::sleep(Duration::from_millis(2)).await,
                other => return Ok(other),
            }
        }
        Ok(ReadOutcome::WouldBlock)
    }

    #[tokio::test]
    async fn assembles_message_from_chunked_delivery() {
        let (client, server) = tokio::io::duplex(256);
        let (_client_read, mut client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);
        let mut transport = FramedTransport::new(server_read, server_write);

        let body = "x".repeat(50);
        let framed = format!("Content-Length: 50\r\n\r\n{body}");
        let bytes = framed.into_bytes();

        // Header, then the 50-byte payload in 17/17/16 chunks with delays.
        let header_len = bytes.len() - 50;
        let writer = tokio::spawn(async move {
            client_write.write_all(&bytes[..header_len]).await.unwrap();
            let payload = &bytes[header_len..];
            for part in [&payload[..17], &payload[17..34], &payload[34..]] {
                tokio::time::sleep(Duration::from_millis(10)).await;
                client_write.write_all(part).await.unwrap();
                client_write.flush().await.unwrap();
            }
        });

        let outcome = poll_until(&mut transport).await.unwrap();
        writer.await.unwrap();
        match outcome {
            ReadOutcome::Payload(p) => assert_eq!(p, body),
            other => panic!("expected payload, got {other:?}"),
        }

        // Exactly one message came out of the three chunks.
        assert!(matches!(
            transport.poll_message().unwrap(),
            ReadOutcome::WouldBlock
        ));
    }

    #[tokio::test]
    async fn malformed_length_is_fatal() {
        let (client, server) = tokio::io::duplex(256);
        let (_client_read, mut client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);
        let mut transport = FramedTransport::new(server_read, server_write);

        client_write
            .write_all(b"Content-Length: abc\r\n\r\n{}")
            .await
            .unwrap();
        client_write.flush().await.unwrap();

        let err = poll_until(&mut transport).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Framing(_)));
    }

    #[tokio::test]
    async fn peer_closure_reports_closed() {
        let (client, server) = tokio::io::duplex(256);
        let (server_read, server_write) = tokio::io::split(server);
        let mut transport = FramedTransport::new(server_read, server_write);

        drop(client);

        let outcome = poll_until(&mut transport).await.unwrap();
        assert!(matches!(outcome, ReadOutcome::Closed));
    }

    #[tokio::test]
    async fn write_produces_framed_output() {
        let (client, server) = tokio::io::duplex(256);
        let (mut client_read, _client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);
        let mut transport = FramedTransport::new(server_read, server_write);

        transport.write_message("{\"jsonrpc\":\"2.0\"}").await.unwrap();

        let mut out = vec![0u8; 128];
        let n = client_read.read(&mut out).await.unwrap();
        let text = std::str::from_utf8(&out[..n]).unwrap();
        assert_eq!(text, "Content-Length: 17\r\n\r\n{\"jsonrpc\":\"2.0\"}");
    }
}
