//! # Foam Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core components of Foam: the configuration and
//! error infrastructure shared by every command, and the snapshot engine that
//! does the actual work.
//!
//! ## Architecture
//!
//! - `config`: Loading and validation of `~/.foam.toml`
//! - `error`: Structural error types and the crate-wide `Result` alias
//! - `snapshot`: Path mapping, capture (`track`), restore (`reset`) and the
//!   tracking registry (`--list`, `--undo`)
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{FoamError, Result};
//! use crate::core::snapshot::{BackupStore, SnapshotEngine};
//! ```
//!
pub mod config;
pub mod error;
pub mod snapshot;
