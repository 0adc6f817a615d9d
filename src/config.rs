// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Layered configuration: defaults, then the user config file, then an
//! explicit `--config` file, then `SIGNET_*` environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Runtime configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Minimum milliseconds between reindex passes over edited documents.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Backoff sleep in milliseconds when no input is ready.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    /// Milliseconds between parent-process liveness probes.
    #[serde(default = "default_parent_poll_ms")]
    pub parent_poll_ms: u64,

    /// Builtin signature entries, name → signature text. Installed into
    /// the index once the handshake completes.
    #[serde(default)]
    pub signatures: HashMap<String, String>,
}

fn default_throttle_ms() -> u64 {
    200
}

fn default_poll_ms() -> u64 {
    10
}

fn default_parent_poll_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from standard paths or a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error when a config source exists but fails to parse or
    /// deserialize.
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // 1. Start with defaults
        builder = builder
            .set_default("throttle_ms", 200)?
            .set_default("poll_ms", 10)?
            .set_default("parent_poll_ms", 2000)?;

        // 2. Load from user config directory (~/.config/signet-ls/config.toml)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("signet-ls").join("config.toml");
            if config_path.exists() {
                builder = builder.add_source(config::File::from(config_path));
            }
        }

        // 3. Load from explicit file if provided
        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::from(path));
        }

        // 4. Load from environment variables (SIGNET_THROTTLE_MS, etc.)
        builder = builder.add_source(config::Environment::with_prefix("SIGNET"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
