//! # Foam Tracking Registry
//!
//! File: cli/src/core/snapshot/registry.rs
//!
//! ## Overview
//!
//! Read and discard the current snapshot without touching the tracked folders:
//! `list` reports which folders are tracked, `undo` deletes the store.
//!
use crate::core::error::Result;
use crate::core::snapshot::report::{Issue, IssueKind, ListOutcome, UndoOutcome};
use crate::core::snapshot::store::BackupStore;
use tracing::info;

#[derive(Debug)]
pub struct TrackingRegistry<'a> {
    store: &'a BackupStore,
}

impl<'a> TrackingRegistry<'a> {
    pub fn new(store: &'a BackupStore) -> Self {
        Self { store }
    }

    /// Original paths of the currently tracked folders.
    pub fn list(&self) -> Result<ListOutcome> {
        if !self.store.exists() {
            return Ok(ListOutcome::NothingTracked);
        }
        let originals = self
            .store
            .tracked_roots()?
            .into_iter()
            .map(|root| root.original)
            .collect();
        Ok(ListOutcome::Tracked(originals))
    }

    /// Deletes the snapshot. Objects that survive the deletion come back as
    /// `Leftover` warnings.
    pub fn undo(&self) -> Result<UndoOutcome> {
        if !self.store.exists() {
            return Ok(UndoOutcome::NothingTracked);
        }
        let issues = self
            .store
            .discard()
            .into_iter()
            .map(|leftover| {
                Issue::new(leftover.path, IssueKind::Leftover, leftover.error.to_string())
            })
            .collect();
        info!("Cleared snapshot at {:?}", self.store.root());
        Ok(UndoOutcome::Cleared(issues))
    }
}
