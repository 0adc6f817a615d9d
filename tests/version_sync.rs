// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Keeps version and naming metadata in sync across the repo.

/// The version examples in the build script's docs must track the real
/// package version, or `--version` output stops matching what the docs
/// promise.
#[test]
fn test_version_sync() {
    let cargo_toml = std::fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let cargo_table: toml::Table = cargo_toml.parse().expect("Failed to parse Cargo.toml");
    let cargo_version = cargo_table["package"]["version"]
        .as_str()
        .expect("Cargo.toml package.version is not a string");

    let build_script = std::fs::read_to_string("build.rs").expect("Failed to read build.rs");
    assert!(
        build_script.contains(cargo_version),
        "build.rs doc examples reference a stale version: Cargo.toml has {cargo_version}"
    );
}

/// The binary name is advertised to editors in `serverInfo` and baked
/// into config paths; `[[bin]]` and `default-run` must agree on it.
#[test]
fn test_bin_name_sync() {
    let cargo_toml = std::fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let cargo_table: toml::Table = cargo_toml.parse().expect("Failed to parse Cargo.toml");

    let bin_name = cargo_table["bin"][0]["name"]
        .as_str()
        .expect("Cargo.toml bin name is not a string");
    let default_run = cargo_table["package"]["default-run"]
        .as_str()
        .expect("Cargo.toml package.default-run is not a string");

    assert_eq!(bin_name, "signet-ls");
    assert_eq!(default_run, bin_name);
}
