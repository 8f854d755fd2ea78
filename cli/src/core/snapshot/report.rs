//! # Foam Snapshot Reports
//!
//! File: cli/src/core/snapshot/report.rs
//!
//! Structured results returned by the engine operations. The engine never
//! prints; the command layer decides how to render these.
//!
use crate::core::snapshot::store::TrackedRoot;
use std::fmt;
use std::path::PathBuf;

/// Category of a per-path problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The folder to track does not exist.
    NotFound,
    /// The folder to track exists but is not a directory.
    NotADirectory,
    /// The path cannot be expressed relative to its anchor.
    Unmappable,
    /// The folder contains the backup store or lies inside it.
    Overlap,
    /// The folder's place in the store is already taken by an earlier input.
    AlreadyTracked,
    /// Copying a folder into the store failed.
    CopyFailed,
    /// A FIFO, socket or device node was skipped.
    Unsupported,
    /// An existing original could not be removed before restoring it.
    RemoveFailed,
    /// Recreating an original from the store failed.
    RestoreFailed,
    /// Re-applying read-only permissions after a restore failed.
    PermissionFailed,
    /// An object survived deletion of the store.
    Leftover,
}

impl IssueKind {
    /// Warnings do not count as errors in summaries.
    pub fn is_warning(self) -> bool {
        matches!(self, IssueKind::Unsupported | IssueKind::Leftover)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueKind::NotFound => "does not exist",
            IssueKind::NotADirectory => "is not a directory",
            IssueKind::Unmappable => "cannot be mapped into the store",
            IssueKind::Overlap => "overlaps the backup store",
            IssueKind::AlreadyTracked => "is already tracked",
            IssueKind::CopyFailed => "could not be tracked",
            IssueKind::Unsupported => "is not a regular file, directory or symlink",
            IssueKind::RemoveFailed => "could not be prepared for restore",
            IssueKind::RestoreFailed => "could not be restored",
            IssueKind::PermissionFailed => "could not be made read-only again",
            IssueKind::Leftover => "could not be removed",
        };
        f.write_str(text)
    }
}

/// One problem tied to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: PathBuf,
    pub kind: IssueKind,
    pub detail: String,
}

impl Issue {
    pub fn new(path: impl Into<PathBuf>, kind: IssueKind, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{} {}", self.path.display(), self.kind)
        } else {
            write!(f, "{} {}: {}", self.path.display(), self.kind, self.detail)
        }
    }
}

/// Result of `track`.
#[derive(Debug, Default)]
pub struct TrackReport {
    pub captured: Vec<TrackedRoot>,
    pub issues: Vec<Issue>,
}

impl TrackReport {
    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|i| !i.kind.is_warning()).count()
    }
}

/// Counts and issues from one restore pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResetReport {
    /// Directories restored, not counting the tracked roots themselves.
    pub directories: usize,
    /// Regular files and symlinks restored.
    pub files: usize,
    pub issues: Vec<Issue>,
}

impl ResetReport {
    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|i| !i.kind.is_warning()).count()
    }
}

/// Result of `reset`.
#[derive(Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    NothingToReset,
    Restored(ResetReport),
}

/// Result of `list`.
#[derive(Debug, PartialEq, Eq)]
pub enum ListOutcome {
    NothingTracked,
    Tracked(Vec<PathBuf>),
}

/// Result of `undo`.
#[derive(Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    NothingTracked,
    /// The store was deleted; any issues are objects that could not be removed.
    Cleared(Vec<Issue>),
}
