//! # Foam Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used for *structural* failures in Foam:
//! conditions that stop a whole command rather than a single filesystem entry.
//! Per-entry problems (a missing folder, a file that failed to restore) are not
//! errors in this sense; they are collected as `Issue` records in
//! `core::snapshot::report` so a command can finish its pass and summarize.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `FoamError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```rust
//! // Refuse a structurally invalid call
//! if !folders.is_empty() {
//!     anyhow::bail!(FoamError::ResetArguments { count: folders.len() });
//! }
//!
//! // Add context to errors using anyhow
//! let text = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read manifest {:?}", path))?;
//! ```
//!
use crate::core::snapshot::mapper::MapError;
use thiserror::Error;

/// Custom error type for the Foam application.
#[derive(Error, Debug)]
pub enum FoamError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error(
        "The reset command does not accept any arguments (got {count}). \
         To reset all tracked folders, use 'foam reset' without arguments."
    )]
    ResetArguments { count: usize },

    #[error("Failed to clear the previous snapshot: {leftovers} item(s) could not be removed.")]
    StoreNotCleared { leftovers: usize },

    #[error("Path mapping error: {source}")]
    Mapping {
        #[from]
        source: MapError,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
