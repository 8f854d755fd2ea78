//! # Foam Snapshot Engine (`core::snapshot`)
//!
//! File: cli/src/core/snapshot/mod.rs
//!
//! ## Overview
//!
//! A single-generation snapshot of a set of folders, kept in one flat backup
//! store. `track` replaces the snapshot, `reset` writes it back over the
//! originals, and the registry lists or discards it.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - **`mapper`**: `PathMapper` and the `AnchorScheme` implementations that turn an absolute path into its place in the store and back.
//! - **`manifest`**: the TOML file in the store listing tracked roots and objects that were read-only.
//! - **`store`**: `BackupStore`, which owns the mapper and knows how to create, discard and enumerate the store.
//! - **`capture`**: `SnapshotEngine` (`track`).
//! - **`restore`**: `RestoreEngine` (`reset`).
//! - **`registry`**: `TrackingRegistry` (`list`, `undo`).
//! - **`report`**: the structured results all of the above return.
//!
//! ## Usage
//!
//! ```rust
//! let config = config::load_config()?;
//! let store = BackupStore::from_config(&config);
//! let report = SnapshotEngine::new(&store).track(&folders)?;
//! let outcome = RestoreEngine::new(&store, config.restore.preserve_read_only).reset(&[])?;
//! ```
//!
pub mod capture;
pub mod manifest;
pub mod mapper;
pub mod registry;
pub mod report;
pub mod restore;
pub mod store;

pub use capture::SnapshotEngine;
pub use registry::TrackingRegistry;
pub use report::{Issue, IssueKind, ListOutcome, ResetOutcome, TrackReport, UndoOutcome};
pub use restore::RestoreEngine;
pub use store::BackupStore;
