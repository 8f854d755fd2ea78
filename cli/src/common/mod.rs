//! # Foam Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared helpers that are not specific to snapshots. Keeping them apart from
//! `core::snapshot` leaves the engine free of platform details.
//!
//! ## Architecture
//!
//! - **`fs`**: Filesystem operations: directory creation, forced removal, permission bits, symlink-preserving copies. Includes `io`, `copy`, `links`.
//! - **`system`**: Host-specific helpers, currently hiding the backup store.
//!

/// Utilities for filesystem operations (copying, I/O, links).
pub mod fs;
/// Host-specific helpers (hidden attribute).
pub mod system;
