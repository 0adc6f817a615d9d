// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! The signet-ls binary.
//!
//! Serves one editor client per process over stdio (default) or a single
//! TCP connection. Logging goes to stderr; stdout belongs to the protocol.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use signet_lsp::config::Config;
use signet_lsp::features::workspace::Workspace;
use signet_lsp::server::{Engine, EngineOptions};
use signet_lsp::state::TransportKind;
use signet_lsp::transport::FramedTransport;

/// Command-line arguments for signet-ls.
#[derive(Parser, Debug)]
#[command(name = "signet-ls")]
#[command(about = "Framed JSON-RPC language server with a signature-database backend")]
#[command(version = env!("SIGNET_VERSION"))]
struct Args {
    /// Connect to the editor over TCP at HOST:PORT instead of stdio.
    #[arg(long, value_name = "HOST:PORT")]
    tcp: Option<String>,

    /// Path to configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum milliseconds between reindex passes (overrides config).
    #[arg(long)]
    throttle_ms: Option<u64>,
}

/// Entry point.
///
/// # Errors
///
/// Returns an error when startup fails or the loop hits a fatal protocol
/// fault. Exits non-zero when the peer skipped the shutdown handshake.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("signet_lsp=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config).context("Failed to load configuration")?;
    if let Some(throttle_ms) = args.throttle_ms {
        config.throttle_ms = throttle_ms;
    }

    let (transport, kind) = match args.tcp.as_deref() {
        Some(addr) => {
            info!(addr, "connecting over TCP");
            let transport = FramedTransport::connect(addr)
                .await
                .with_context(|| format!("Failed to connect to {addr}"))?;
            (transport, TransportKind::Tcp)
        }
        None => (FramedTransport::stdio(), TransportKind::Stdio),
    };

    let options = EngineOptions {
        throttle: Duration::from_millis(config.throttle_ms),
        poll: Duration::from_millis(config.poll_ms),
        parent_poll: Duration::from_millis(config.parent_poll_ms),
    };
    let workspace = Workspace::new(config.signatures);

    let mut engine = Engine::new(transport, kind, workspace, options);
    engine.run().await?;

    if engine.shutdown_was_clean() {
        info!("clean shutdown");
        Ok(())
    } else {
        info!("terminated without shutdown handshake");
        std::process::exit(1);
    }
}
