//! # Foam Snapshot Manifest
//!
//! File: cli/src/core/snapshot/manifest.rs
//!
//! ## Overview
//!
//! A small TOML file kept at the top of the backup store. It lists the folders
//! the current snapshot actually tracks and the objects that were read-only
//! when they were captured. Entries are store-relative `ManifestKey`s produced
//! and decoded by `PathMapper`: readable text for UTF-8 paths, base64 of the
//! native encoding otherwise.
//!
//! ```toml
//! version = 1
//!
//! [[roots]]
//! path = "data/proj"
//!
//! [[read_only]]
//! path = "data/proj/LICENSE"
//!
//! [[read_only]]
//! raw = "ZGF0YS9wcm9qL_4udHh0"
//! ```
//!
//! The manifest is a file, so the directory-only walk over the store's top
//! levels never sees it.
//!
use crate::common::fs::io as fsio;
use crate::core::error::{FoamError, Result};
use crate::core::snapshot::mapper::ManifestKey;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the manifest inside the store root.
pub const MANIFEST_FILENAME: &str = ".foam-manifest.toml";

const MANIFEST_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Store-relative keys of the tracked roots, in capture order.
    #[serde(default)]
    pub roots: Vec<ManifestKey>,
    /// Store-relative keys of objects whose write bit was forced during capture.
    #[serde(default)]
    pub read_only: Vec<ManifestKey>,
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            roots: Vec::new(),
            read_only: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn path_in(store_root: &Path) -> PathBuf {
        store_root.join(MANIFEST_FILENAME)
    }

    /// Reads the manifest from `store_root`; `None` if the store has none.
    pub fn load(store_root: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(store_root);
        if !path.is_file() {
            debug!("No manifest at {:?}", path);
            return Ok(None);
        }
        let text = fsio::read_file_to_string(&path)?;
        let manifest: Manifest = toml::from_str(&text).map_err(|e| {
            anyhow!(FoamError::FileSystem(format!(
                "Snapshot manifest {:?} is corrupt: {}",
                path, e
            )))
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(anyhow!(FoamError::FileSystem(format!(
                "Snapshot manifest {:?} has unsupported version {}",
                path, manifest.version
            ))));
        }
        Ok(Some(manifest))
    }

    pub fn save(&self, store_root: &Path) -> Result<()> {
        let text = toml::to_string(self).map_err(|e| {
            anyhow!(FoamError::FileSystem(format!(
                "Failed to serialize snapshot manifest: {}",
                e
            )))
        })?;
        fsio::write_string_to_file(&Self::path_in(store_root), &text)
    }
}
