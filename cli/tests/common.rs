//! # Foam CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test files (`track.rs`, `reset.rs`, ...).
//! Every test runs the real `foam` binary with `HOME` pointed at a temporary
//! directory, so the backup store and the optional `~/.foam.toml` live inside
//! that directory and the user's real home is never touched.
//!

// Not every test file uses every helper.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// # Get Foam Command (`foam_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `foam` binary.
///
/// ## Panics
/// Panics if the `foam` binary cannot be found via `Command::cargo_bin`.
pub fn foam_cmd() -> Command {
    Command::cargo_bin("foam").expect("Failed to find foam binary for testing")
}

/// `foam_cmd()` with the home directory set to `home`.
pub fn foam_in(home: &Path) -> Command {
    let mut cmd = foam_cmd();
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

/// Creates `<home>/work/<name>` and returns its canonical path.
pub fn work_dir(home: &Path, name: &str) -> PathBuf {
    let dir = home.join("work").join(name);
    std::fs::create_dir_all(&dir).expect("Failed to create work directory");
    std::fs::canonicalize(&dir).expect("Failed to canonicalize work directory")
}
