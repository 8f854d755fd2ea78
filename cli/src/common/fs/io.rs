//! # Foam Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes the basic filesystem operations the snapshot
//! engine builds on: ensuring directories exist, reading and writing small
//! text files (the snapshot manifest), toggling the owner write bit, and
//! removing trees that may contain read-only objects.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, with a check that an existing path really is a directory.
//! - **`read_file_to_string`** / **`write_string_to_file`**: thin wrappers adding `anyhow` context.
//! - **`force_writable`** / **`clear_writable`**: add or remove the owner write bit (the read-only attribute on Windows). Never applied to symlinks.
//! - **`remove_entry_forced`**: removes one file, symlink or empty directory, retrying once after forcing write permission on it and its parent.
//! - **`remove_tree_forced`**: removes a whole tree children-first with `remove_entry_forced`, collecting what could not be removed instead of stopping.
//! - **`remove_existing`**: strict variant used before restoring an entry; anything left behind is an error.
//!
use crate::common::fs::links;
use crate::core::error::{FoamError, Result};
use anyhow::Context;
use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// An object that survived a forced removal.
#[derive(Debug)]
pub struct Leftover {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, this function creates it together with any
/// missing parents. If the path exists but is not a directory,
/// `FoamError::FileSystem` is returned.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(FoamError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file, creating parent directories and
/// overwriting any existing file.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Adds the owner write permission to a file or directory.
///
/// Returns `true` if the permission had to be added, `false` if the object was
/// already writable or is a symlink (whose own mode is never touched).
pub fn force_writable(path: &Path) -> io::Result<bool> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(false);
    }
    let mut perms = meta.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = perms.mode();
        if mode & 0o200 != 0 {
            return Ok(false);
        }
        perms.set_mode(mode | 0o200);
    }
    #[cfg(not(unix))]
    {
        if !perms.readonly() {
            return Ok(false);
        }
        perms.set_readonly(false);
    }
    fs::set_permissions(path, perms)?;
    Ok(true)
}

/// Removes the owner write permission from a file or directory. Symlinks are left alone.
pub fn clear_writable(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(());
    }
    let mut perms = meta.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() & !0o200);
    }
    #[cfg(not(unix))]
    {
        perms.set_readonly(true);
    }
    fs::set_permissions(path, perms)
}

fn remove_entry(path: &Path, file_type: FileType) -> io::Result<()> {
    if file_type.is_symlink() {
        links::remove_symlink(path)
    } else if file_type.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Removes a single filesystem object (an empty directory, a file or a
/// symlink). On a permission error, write permission is forced on the object
/// and on its parent directory, then the removal is retried exactly once.
pub fn remove_entry_forced(path: &Path, file_type: FileType) -> io::Result<()> {
    match remove_entry(path, file_type) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            debug!(
                "Permission denied removing {:?}, forcing write permission and retrying",
                path
            );
            if let Err(e) = force_writable(path) {
                debug!("Could not force write permission on {:?}: {}", path, e);
            }
            if let Some(parent) = path.parent() {
                if let Err(e) = force_writable(parent) {
                    debug!("Could not force write permission on {:?}: {}", parent, e);
                }
            }
            remove_entry(path, file_type)
        }
        Err(err) => Err(err),
    }
}

/// Recursively removes `path`, tolerating read-only objects.
///
/// Objects that still cannot be removed after one forced retry are logged as
/// warnings and returned; removal of everything else continues. An empty
/// result means the path is gone.
pub fn remove_tree_forced(path: &Path) -> Vec<Leftover> {
    let mut leftovers = Vec::new();

    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return leftovers,
        Err(e) => {
            warn!("Could not inspect {:?}: {}", path, e);
            leftovers.push(Leftover {
                path: path.to_path_buf(),
                error: e,
            });
            return leftovers;
        }
    };
    if !meta.is_dir() {
        if let Err(e) = remove_entry_forced(path, meta.file_type()) {
            warn!("Could not remove {:?}: {}", path, e);
            leftovers.push(Leftover {
                path: path.to_path_buf(),
                error: e,
            });
        }
        return leftovers;
    }

    for entry in WalkDir::new(path).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let failed = e.path().unwrap_or(path).to_path_buf();
                warn!("Could not read {:?} while removing: {}", failed, e);
                leftovers.push(Leftover {
                    path: failed,
                    error: e.into(),
                });
                continue;
            }
        };
        if let Err(e) = remove_entry_forced(entry.path(), entry.file_type()) {
            warn!("Could not remove {:?}: {}", entry.path(), e);
            leftovers.push(Leftover {
                path: entry.path().to_path_buf(),
                error: e,
            });
        }
    }

    if leftovers.is_empty() {
        info!("Removed {:?}", path);
    }
    leftovers
}

/// Removes whatever exists at `path` (checked without following symlinks,
/// so dangling links count). Directories go recursively with the same forced
/// retry as `remove_tree_forced`, but any leftover makes this an error.
pub fn remove_existing(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("Failed to inspect {:?}", path)),
    };
    if meta.is_dir() {
        let mut leftovers = remove_tree_forced(path);
        if let Some(first) = leftovers.drain(..).next() {
            return Err(first.error)
                .with_context(|| format!("Failed to remove {:?}", first.path));
        }
        Ok(())
    } else {
        remove_entry_forced(path, meta.file_type())
            .with_context(|| format!("Failed to remove {:?}", path))
    }
}
