//! # Foam System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Host-specific helpers that do not belong to plain file I/O. Currently this
//! is only `hide_path`, used to hide the backup store from casual directory
//! listings. Hiding is cosmetic: a failure is logged and otherwise ignored.
//!
//! On Unix-like systems the store's dot-prefixed name already hides it, so
//! nothing is done. On Windows the hidden attribute is set with `attrib +H`.
//!
use std::path::Path;
use tracing::debug;

/// Marks `path` as hidden where the platform has a hidden attribute.
pub fn hide_path(path: &Path) {
    #[cfg(windows)]
    {
        use tracing::warn;
        match std::process::Command::new("attrib")
            .arg("+H")
            .arg(path)
            .output()
        {
            Ok(output) if output.status.success() => {
                debug!("Set hidden attribute on {:?}", path);
            }
            Ok(output) => warn!(
                "Could not hide {:?}: attrib exited with {}: {}",
                path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => warn!("Could not hide {:?}: {}", path, e),
        }
    }
    #[cfg(not(windows))]
    {
        debug!("No hidden attribute on this platform, leaving {:?} as is", path);
    }
}
