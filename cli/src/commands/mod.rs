//! # Foam Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the Foam CLI. Each command
//! module defines its Clap arguments and a handler that calls into
//! `core::snapshot` and prints the structured result for the user.
//!
//! ## Command Groups
//!
//! - `track`: Capture folders, or list / clear the current snapshot
//! - `reset`: Restore every tracked folder from the snapshot
//!
//! The engine never prints. Rendering of per-path issues is shared here so
//! both commands phrase problems the same way.
//!
use crate::core::snapshot::{Issue, IssueKind};

/// Command for restoring the tracked folders.
pub mod reset;
/// Command for capturing folders and managing the snapshot (`--list`, `--undo`).
pub mod track;

/// One-line, user-facing description of a per-path issue.
pub(crate) fn describe_issue(issue: &Issue) -> String {
    let path = issue.path.display();
    match issue.kind {
        IssueKind::NotFound | IssueKind::NotADirectory => {
            format!("Folder {} does not exist or is not a directory.", path)
        }
        IssueKind::CopyFailed => format!("Failed to track {}: {}", path, issue.detail),
        IssueKind::Unmappable | IssueKind::Overlap | IssueKind::AlreadyTracked => {
            if issue.detail.is_empty() {
                format!("Failed to track {}: it {}", path, issue.kind)
            } else {
                format!("Failed to track {}: it {} ({})", path, issue.kind, issue.detail)
            }
        }
        IssueKind::RemoveFailed => {
            format!("Error: Could not prepare {} for restore: {}", path, issue.detail)
        }
        IssueKind::RestoreFailed => format!("Error: Could not restore {}: {}", path, issue.detail),
        IssueKind::PermissionFailed => format!(
            "Error: Could not make {} read-only again: {}",
            path, issue.detail
        ),
        IssueKind::Unsupported => format!(
            "Warning: Skipped {}: not a regular file, directory or symlink",
            path
        ),
        IssueKind::Leftover => format!("Warning: Could not remove {}: {}", path, issue.detail),
    }
}
