//! # Foam Snapshot Capture
//!
//! File: cli/src/core/snapshot/capture.rs
//!
//! ## Overview
//!
//! Implements `track`: replace whatever snapshot the store holds with a fresh
//! copy of the given folders. The operation is two explicit steps:
//!
//! 1. `discard_current_snapshot` deletes the previous store. If anything
//!    survives the forced deletion the whole operation stops, so the store
//!    never mixes two generations.
//! 2. `create_snapshot` recreates the empty (hidden) store and copies each
//!    folder to its mapped location, then writes the manifest.
//!
//! Per-folder problems never abort the run. They are collected as `Issue`s in
//! the returned `TrackReport` and the remaining folders are still captured.
//!
use crate::common::fs::{copy, io as fsio};
use crate::core::error::{FoamError, Result};
use crate::core::snapshot::manifest::Manifest;
use crate::core::snapshot::report::{Issue, IssueKind, TrackReport};
use crate::core::snapshot::store::{BackupStore, TrackedRoot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Captures folders into a `BackupStore`.
#[derive(Debug)]
pub struct SnapshotEngine<'a> {
    store: &'a BackupStore,
}

impl<'a> SnapshotEngine<'a> {
    pub fn new(store: &'a BackupStore) -> Self {
        Self { store }
    }

    /// Discards the current snapshot and captures `folders` as the new one.
    ///
    /// # Errors
    ///
    /// `FoamError::StoreNotCleared` if the previous snapshot could not be fully
    /// deleted, or any error creating the store or writing its manifest.
    /// Problems with individual folders are reported in the `TrackReport`.
    pub fn track<P: AsRef<Path>>(&self, folders: &[P]) -> Result<TrackReport> {
        self.discard_current_snapshot()?;
        self.create_snapshot(folders)
    }

    /// Deletes the store if it exists. Fails when anything is left behind.
    pub fn discard_current_snapshot(&self) -> Result<()> {
        if !self.store.exists() {
            debug!("No previous snapshot at {:?}", self.store.root());
            return Ok(());
        }
        let leftovers = self.store.discard();
        if !leftovers.is_empty() {
            for leftover in &leftovers {
                warn!(
                    "Could not remove {:?} from the previous snapshot: {}",
                    leftover.path, leftover.error
                );
            }
            anyhow::bail!(FoamError::StoreNotCleared {
                leftovers: leftovers.len()
            });
        }
        Ok(())
    }

    /// Creates a new store holding a copy of each usable folder.
    pub fn create_snapshot<P: AsRef<Path>>(&self, folders: &[P]) -> Result<TrackReport> {
        self.store.create()?;
        // Inputs are canonical, so the overlap check needs a canonical store path too.
        let store_root =
            fs::canonicalize(self.store.root()).unwrap_or_else(|_| self.store.root().to_path_buf());

        let mut report = TrackReport::default();
        let mut manifest = Manifest::default();

        for folder in folders {
            let folder = folder.as_ref();
            match self.capture_folder(folder, &store_root, &mut manifest, &mut report) {
                Ok(root) => {
                    info!("Tracked {:?} -> {:?}", root.original, root.backup);
                    report.captured.push(root);
                }
                Err(issue) => {
                    warn!("Skipping {:?}: {}", folder, issue);
                    report.issues.push(issue);
                }
            }
        }

        self.store.write_manifest(&manifest)?;
        info!(
            "Snapshot created with {} folder(s), {} issue(s)",
            report.captured.len(),
            report.issues.len()
        );
        Ok(report)
    }

    /// Copies one folder into the store and records it in `manifest`.
    fn capture_folder(
        &self,
        folder: &Path,
        store_root: &Path,
        manifest: &mut Manifest,
        report: &mut TrackReport,
    ) -> std::result::Result<TrackedRoot, Issue> {
        let original = match fs::canonicalize(folder) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Issue::new(folder, IssueKind::NotFound, ""))
            }
            Err(e) => return Err(Issue::new(folder, IssueKind::CopyFailed, e.to_string())),
        };
        if !original.is_dir() {
            return Err(Issue::new(original, IssueKind::NotADirectory, ""));
        }
        if original.starts_with(store_root) || store_root.starts_with(&original) {
            return Err(Issue::new(
                original,
                IssueKind::Overlap,
                format!("store is {}", store_root.display()),
            ));
        }

        let mapper = self.store.mapper();
        let backup = mapper
            .to_backup_path(&original)
            .map_err(|e| Issue::new(&original, IssueKind::Unmappable, e.to_string()))?;
        if fs::symlink_metadata(&backup).is_ok() {
            return Err(Issue::new(
                original,
                IssueKind::AlreadyTracked,
                "it overlaps a folder given earlier",
            ));
        }
        let root_key = mapper
            .to_manifest_key(&backup)
            .map_err(|e| Issue::new(&original, IssueKind::Unmappable, e.to_string()))?;

        if let Some(parent) = backup.parent() {
            fsio::ensure_dir_exists(parent)
                .map_err(|e| Issue::new(&original, IssueKind::CopyFailed, format!("{:#}", e)))?;
        }

        let copied = match copy::copy_tree(&original, &backup) {
            Ok(copied) => copied,
            Err(e) => {
                for leftover in fsio::remove_tree_forced(&backup) {
                    warn!(
                        "Could not remove partial copy {:?}: {}",
                        leftover.path, leftover.error
                    );
                }
                return Err(Issue::new(original, IssueKind::CopyFailed, format!("{:#}", e)));
            }
        };

        for forced in &copied.forced_writable {
            match mapper.to_manifest_key(forced) {
                Ok(key) => manifest.read_only.push(key),
                Err(e) => warn!("Cannot record read-only object {:?}: {}", forced, e),
            }
        }
        for special in copied.skipped_special {
            report
                .issues
                .push(Issue::new(special, IssueKind::Unsupported, "skipped"));
        }
        manifest.roots.push(root_key);

        Ok(TrackedRoot { original, backup })
    }
}
