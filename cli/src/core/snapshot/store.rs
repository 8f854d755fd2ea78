//! # Foam Backup Store
//!
//! File: cli/src/core/snapshot/store.rs
//!
//! ## Overview
//!
//! The backup store is the single directory that holds the current snapshot.
//! `BackupStore` owns the `PathMapper` for that directory and provides the
//! operations shared by every engine component: checking whether a snapshot
//! exists, creating and discarding the directory, reading and writing the
//! manifest, and enumerating the tracked roots.
//!
//! ## Tracked root enumeration
//!
//! When the manifest is present its `roots` list is authoritative. Without a
//! manifest the store's top two directory levels are walked (anchor segment,
//! then first-level folder) and each hit is decoded with
//! `PathMapper::to_original_path`.
//!
use crate::common::fs::io::{self as fsio, Leftover};
use crate::common::system;
use crate::core::config::Config;
use crate::core::error::{FoamError, Result};
use crate::core::snapshot::manifest::Manifest;
use crate::core::snapshot::mapper::PathMapper;
use anyhow::Context;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A tracked folder: where it lives and where its copy lives in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRoot {
    pub original: PathBuf,
    pub backup: PathBuf,
}

#[derive(Debug)]
pub struct BackupStore {
    mapper: PathMapper,
}

impl BackupStore {
    pub fn new(mapper: PathMapper) -> Self {
        Self { mapper }
    }

    /// Store at the configured location, using the platform's anchor convention.
    pub fn from_config(config: &Config) -> Self {
        Self::new(PathMapper::for_platform(config.store_dir()))
    }

    pub fn root(&self) -> &Path {
        self.mapper.store_root()
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Whether a snapshot (even an empty one) exists.
    pub fn exists(&self) -> bool {
        self.root().is_dir()
    }

    /// Creates the empty store directory and hides it.
    pub fn create(&self) -> Result<()> {
        fsio::ensure_dir_exists(self.root())
            .with_context(|| format!("Failed to create backup store {:?}", self.root()))?;
        system::hide_path(self.root());
        info!("Created backup store {:?}", self.root());
        Ok(())
    }

    /// Deletes the whole store, tolerating read-only content. Returns whatever
    /// could not be removed.
    pub fn discard(&self) -> Vec<Leftover> {
        info!("Discarding backup store {:?}", self.root());
        fsio::remove_tree_forced(self.root())
    }

    pub fn manifest(&self) -> Result<Option<Manifest>> {
        Manifest::load(self.root())
    }

    pub fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        manifest.save(self.root())
    }

    /// Every tracked root of the current snapshot, in manifest order (or
    /// sorted by path when falling back to the directory walk).
    pub fn tracked_roots(&self) -> Result<Vec<TrackedRoot>> {
        let backups = match self.manifest()? {
            Some(manifest) => {
                let mut backups = Vec::new();
                for key in &manifest.roots {
                    let backup = self
                        .mapper
                        .from_manifest_key(key)
                        .map_err(FoamError::from)?;
                    if backup.is_dir() {
                        backups.push(backup);
                    } else {
                        warn!("Tracked root {:?} is missing from the store", backup);
                    }
                }
                backups
            }
            None => {
                debug!("No manifest in {:?}, scanning top levels", self.root());
                self.scan_top_levels()?
            }
        };

        backups
            .into_iter()
            .map(|backup| -> Result<TrackedRoot> {
                let original = self
                    .mapper
                    .to_original_path(&backup)
                    .map_err(FoamError::from)?;
                Ok(TrackedRoot { original, backup })
            })
            .collect()
    }

    /// Backup paths of objects that were read-only when captured.
    pub fn read_only_paths(&self) -> Result<BTreeSet<PathBuf>> {
        let Some(manifest) = self.manifest()? else {
            return Ok(BTreeSet::new());
        };
        let paths: BTreeSet<PathBuf> = manifest
            .read_only
            .iter()
            .map(|key| self.mapper.from_manifest_key(key))
            .collect::<std::result::Result<_, _>>()
            .map_err(FoamError::from)?;
        Ok(paths)
    }

    /// Directories exactly two levels below the store root.
    fn scan_top_levels(&self) -> Result<Vec<PathBuf>> {
        let mut roots = Vec::new();
        for anchor in sorted_subdirs(self.root())? {
            roots.extend(sorted_subdirs(&anchor)?);
        }
        Ok(roots)
    }
}

/// Real (non-symlink) subdirectories of `dir`, sorted by name.
fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect {:?}", entry.path()))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
