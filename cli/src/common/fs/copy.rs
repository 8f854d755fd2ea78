//! # Foam Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Copying primitives used to capture folders into the backup store and to put
//! files back during a reset.
//!
//! ## Architecture
//!
//! - **`copy_file_with_metadata`**: copies one regular file's content, then its
//!   access/modification times and permission bits onto the copy.
//! - **`copy_tree`**: recursive copy that keeps symlinks as symlinks, copies
//!   regular files with `copy_file_with_metadata`, and forces the owner write bit
//!   on every copied file and directory so the copy can always be replaced or
//!   deleted later. The paths that needed forcing are reported back to the
//!   caller. FIFOs, sockets and device nodes are skipped and reported instead of
//!   being opened.
//!
//! The tree walk uses `walkdir` with `follow_links(false)` and sorted entries, so
//! parents are always created before their children.
//!
use crate::common::fs::{io as fsio, links};
use crate::core::error::Result;
use anyhow::Context;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What `copy_tree` did besides plain copying.
#[derive(Debug, Default)]
pub struct TreeCopy {
    /// Destination paths whose write bit was added (the source was read-only).
    pub forced_writable: Vec<PathBuf>,
    /// Source paths that were not copied because they are not a file, directory or symlink.
    pub skipped_special: Vec<PathBuf>,
    /// Number of regular files and symlinks copied.
    pub files: usize,
    /// Number of directories created, including the top-level one.
    pub directories: usize,
}

/// Copies a regular file's bytes, timestamps and permission bits from `source`
/// to `dest`. `dest` is created or truncated.
pub fn copy_file_with_metadata(source: &Path, dest: &Path) -> Result<()> {
    let mut reader =
        File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
    let meta = reader
        .metadata()
        .with_context(|| format!("Failed to read metadata of {:?}", source))?;
    let mut writer =
        File::create(dest).with_context(|| format!("Failed to create {:?}", dest))?;
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    writer
        .set_times(times)
        .with_context(|| format!("Failed to set timestamps on {:?}", dest))?;
    // Permissions last: the source may be read-only.
    writer
        .set_permissions(meta.permissions())
        .with_context(|| format!("Failed to set permissions on {:?}", dest))?;
    Ok(())
}

fn copy_dir_entry(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir(dest).with_context(|| format!("Failed to create directory {:?}", dest))?;
    let perms = fs::metadata(source)
        .with_context(|| format!("Failed to read metadata of {:?}", source))?
        .permissions();
    fs::set_permissions(dest, perms)
        .with_context(|| format!("Failed to set permissions on {:?}", dest))?;
    Ok(())
}

/// Recursively copies the directory `source` to `target`, which must not exist yet.
///
/// The first entry that cannot be copied aborts the copy with an error; what
/// was already copied is left in place for the caller to clean up.
pub fn copy_tree(source: &Path, target: &Path) -> Result<TreeCopy> {
    info!("Starting recursive copy from {:?} to {:?}", source, target);
    let mut outcome = TreeCopy::default();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Entry {:?} escaped {:?}", entry.path(), source))?;
        let dest = if relative.as_os_str().is_empty() {
            target.to_path_buf()
        } else {
            target.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            links::copy_symlink(entry.path(), &dest)?;
            outcome.files += 1;
            // Link modes are never changed.
            continue;
        } else if file_type.is_dir() {
            copy_dir_entry(entry.path(), &dest)?;
            outcome.directories += 1;
        } else if file_type.is_file() {
            copy_file_with_metadata(entry.path(), &dest)?;
            outcome.files += 1;
        } else {
            warn!("Skipping special file {:?}", entry.path());
            outcome.skipped_special.push(entry.path().to_path_buf());
            continue;
        }

        if fsio::force_writable(&dest)
            .with_context(|| format!("Failed to make {:?} writable", dest))?
        {
            debug!("Forced write permission on {:?}", dest);
            outcome.forced_writable.push(dest);
        }
    }

    info!(
        "Finished recursive copy from {:?} to {:?} ({} directories, {} files)",
        source, target, outcome.directories, outcome.files
    );
    Ok(outcome)
}
