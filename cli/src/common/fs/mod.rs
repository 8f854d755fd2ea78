//! # Foam Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! The filesystem primitives the snapshot engine is built from. None of them
//! follow symlinks: a link is always handled as the link itself.
//!
//! ## Architecture
//!
//! - **`copy`**: Recursive tree copy (`copy_tree`) and single-file copy with timestamps and mode (`copy_file_with_metadata`).
//! - **`io`**: Directory creation, small text files, write-bit helpers and removal that survives read-only content.
//! - **`links`**: Reading, recreating and removing symbolic links on each platform.
//!
//! Callers import the submodule they need, e.g. `crate::common::fs::io::remove_existing`.
//!

/// Tree and file copying.
pub mod copy;
/// Basic I/O, permissions and forced removal.
pub mod io;
/// Symbolic link handling.
pub mod links;
