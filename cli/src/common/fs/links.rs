//! # Foam Filesystem Link Operations
//!
//! File: cli/src/common/fs/links.rs
//!
//! ## Overview
//!
//! Cross-platform helpers for symbolic links. Foam never follows links while
//! capturing or restoring: a link is stored as a link, and restoring it means
//! creating a new link with exactly the same (possibly relative, possibly
//! dangling) target text.
//!
//! ## Architecture
//!
//! - **`copy_symlink`**: reads the target of an existing link and creates an identical link elsewhere.
//! - **`create_symlink`**: creates a link with a given target. Windows needs to know whether the link is a directory link, so the caller passes that along.
//! - **`remove_symlink`**: removes the link itself, never its target.
//!
//! Platform-specific calls use `std::os::unix::fs::symlink` on Unix-like
//! systems and `symlink_file` / `symlink_dir` on Windows.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Whether the link at `link` is a directory link. Only meaningful on Windows;
/// elsewhere links carry no such distinction and this is always `false`.
pub fn is_dir_link(link: &Path) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::FileTypeExt;
        fs::symlink_metadata(link)
            .map(|m| m.file_type().is_symlink_dir())
            .unwrap_or(false)
    }
    #[cfg(not(windows))]
    {
        let _ = link;
        false
    }
}

/// Creates a symbolic link at `link` pointing to `target`.
///
/// `target` is used verbatim; it is not resolved or checked for existence.
/// `dir_link` selects a directory link on Windows and is ignored elsewhere.
pub fn create_symlink(target: &Path, link: &Path, dir_link: bool) -> Result<()> {
    #[cfg(unix)]
    {
        let _ = dir_link;
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!("Failed to create symlink {:?} -> {:?}", link, target)
        })?;
    }
    #[cfg(windows)]
    {
        if dir_link {
            std::os::windows::fs::symlink_dir(target, link).with_context(|| {
                format!("Failed to create directory symlink {:?} -> {:?}", link, target)
            })?;
        } else {
            std::os::windows::fs::symlink_file(target, link).with_context(|| {
                format!("Failed to create file symlink {:?} -> {:?}", link, target)
            })?;
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = dir_link;
        anyhow::bail!(
            "Symlink creation not implemented for this platform: {:?} -> {:?}",
            link,
            target
        );
    }
    debug!("Created symlink: {:?} -> {:?}", link, target);
    Ok(())
}

/// Recreates the link found at `source` as a new link at `dest`.
pub fn copy_symlink(source: &Path, dest: &Path) -> Result<()> {
    let target =
        fs::read_link(source).with_context(|| format!("Failed to read symlink {:?}", source))?;
    create_symlink(&target, dest, is_dir_link(source))
}

/// Removes the symlink at `path` without touching what it points to.
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if is_dir_link(path) {
            return fs::remove_dir(path);
        }
    }
    fs::remove_file(path)
}
