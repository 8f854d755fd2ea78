//! # Foam Snapshot Restore
//!
//! File: cli/src/core/snapshot/restore.rs
//!
//! ## Overview
//!
//! Implements `reset`: put every tracked folder back into the state recorded
//! by the last `track`. The store itself is only read, so a reset can be
//! repeated any number of times.
//!
//! ## Restore pass
//!
//! For each tracked root, every entry below the root's backup is visited
//! parents first, sorted by name, without following symlinks. For each entry:
//!
//! 1. Whatever exists at the original location is removed (a dangling link
//!    counts). Directories go recursively with the forced-write retry.
//! 2. Files are copied back with their timestamps and mode, symlinks are
//!    recreated with the stored target text, directories are created with the
//!    stored mode.
//!
//! The root's own directory is never removed. It is created when missing.
//! Afterwards, objects recorded as read-only in the manifest get their write
//! bit cleared again, children before parents, unless disabled in config.
//!
//! A failing entry is recorded as an `Issue` and the pass moves on.
//!
use crate::common::fs::{copy, io as fsio, links};
use crate::core::error::{FoamError, Result};
use crate::core::snapshot::report::{Issue, IssueKind, ResetOutcome, ResetReport};
use crate::core::snapshot::store::{BackupStore, TrackedRoot};
use anyhow::Context;
use std::collections::BTreeSet;
use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What a stored entry is, judged without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Symlink,
    Special,
}

impl EntryKind {
    fn of(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Special
        }
    }
}

/// Restores tracked folders from a `BackupStore`.
#[derive(Debug)]
pub struct RestoreEngine<'a> {
    store: &'a BackupStore,
    preserve_read_only: bool,
}

impl<'a> RestoreEngine<'a> {
    pub fn new(store: &'a BackupStore, preserve_read_only: bool) -> Self {
        Self {
            store,
            preserve_read_only,
        }
    }

    /// Restores the whole snapshot. `arguments` must be empty: a reset always
    /// applies to every tracked folder.
    ///
    /// # Errors
    ///
    /// `FoamError::ResetArguments` when arguments are given (nothing is
    /// touched), or an error reading the manifest. Per-entry failures are
    /// reported in the `ResetReport`.
    pub fn reset(&self, arguments: &[String]) -> Result<ResetOutcome> {
        if !arguments.is_empty() {
            anyhow::bail!(FoamError::ResetArguments {
                count: arguments.len()
            });
        }
        if !self.store.exists() {
            info!("No backup store at {:?}, nothing to reset", self.store.root());
            return Ok(ResetOutcome::NothingToReset);
        }

        let roots = self.store.tracked_roots()?;
        let read_only = if self.preserve_read_only {
            self.store.read_only_paths()?
        } else {
            BTreeSet::new()
        };

        let mut report = ResetReport::default();
        for root in &roots {
            self.restore_root(root, &read_only, &mut report);
        }
        info!(
            "Reset finished: {} directories, {} files, {} errors",
            report.directories,
            report.files,
            report.errors()
        );
        Ok(ResetOutcome::Restored(report))
    }

    fn restore_root(
        &self,
        root: &TrackedRoot,
        read_only: &BTreeSet<PathBuf>,
        report: &mut ResetReport,
    ) {
        info!("Restoring {:?} from {:?}", root.original, root.backup);
        if let Err(e) = prepare_root(root) {
            warn!("Cannot restore {:?}: {:#}", root.original, e);
            report.issues.push(Issue::new(
                &root.original,
                IssueKind::RestoreFailed,
                format!("{:#}", e),
            ));
            return;
        }

        // Originals to make read-only again, parents first.
        let mut relock = Vec::new();
        if read_only.contains(&root.backup) {
            relock.push(root.original.clone());
        }

        let walker = WalkDir::new(&root.backup)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root.backup.as_path()).to_path_buf();
                    warn!("Could not read {:?} in the store: {}", path, e);
                    report
                        .issues
                        .push(Issue::new(path, IssueKind::RestoreFailed, e.to_string()));
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&root.backup) else {
                continue;
            };
            let original = root.original.join(relative);
            let kind = EntryKind::of(entry.file_type());

            match restore_entry(entry.path(), &original, kind) {
                Ok(()) => {
                    match kind {
                        EntryKind::Directory => report.directories += 1,
                        _ => report.files += 1,
                    }
                    if read_only.contains(entry.path()) {
                        relock.push(original);
                    }
                }
                Err(issue) => {
                    warn!("{}", issue);
                    report.issues.push(issue);
                }
            }
        }

        for path in relock.iter().rev() {
            match fsio::clear_writable(path) {
                Ok(()) => debug!("Restored read-only permission on {:?}", path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Could not make {:?} read-only: {}", path, e);
                    report
                        .issues
                        .push(Issue::new(path, IssueKind::PermissionFailed, e.to_string()));
                }
            }
        }
    }
}

/// Makes sure the root's top directory exists and accepts new entries.
fn prepare_root(root: &TrackedRoot) -> Result<()> {
    match fs::symlink_metadata(&root.original) {
        Ok(meta) if meta.is_dir() => {
            if fsio::force_writable(&root.original)
                .with_context(|| format!("Failed to make {:?} writable", root.original))?
            {
                debug!("Forced write permission on root {:?}", root.original);
            }
            Ok(())
        }
        Ok(_) => {
            // A file or link took the root's place.
            fsio::remove_existing(&root.original)?;
            create_dir_like(&root.backup, &root.original)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Recreating missing root {:?}", root.original);
            create_dir_like(&root.backup, &root.original)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to inspect {:?}", root.original)),
    }
}

/// Creates `dir` (and missing parents) with the permissions of `backup`.
fn create_dir_like(backup: &Path, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {:?}", dir))?;
    let perms = fs::metadata(backup)
        .with_context(|| format!("Failed to read metadata of {:?}", backup))?
        .permissions();
    fs::set_permissions(dir, perms)
        .with_context(|| format!("Failed to set permissions on {:?}", dir))
}

/// Replaces whatever is at `original` with the stored entry at `backup`.
fn restore_entry(
    backup: &Path,
    original: &Path,
    kind: EntryKind,
) -> std::result::Result<(), Issue> {
    let restore: fn(&Path, &Path) -> Result<()> = match kind {
        EntryKind::Special => {
            return Err(Issue::new(original, IssueKind::Unsupported, "skipped"))
        }
        EntryKind::Directory => create_dir_like,
        EntryKind::File => copy::copy_file_with_metadata,
        EntryKind::Symlink => links::copy_symlink,
    };

    fsio::remove_existing(original)
        .map_err(|e| Issue::new(original, IssueKind::RemoveFailed, format!("{:#}", e)))?;

    let parent_ready = match original.parent() {
        Some(parent) => fsio::ensure_dir_exists(parent),
        None => Ok(()),
    };
    parent_ready
        .and_then(|()| restore(backup, original))
        .map_err(|e| Issue::new(original, IssueKind::RestoreFailed, format!("{:#}", e)))?;
    debug!("Restored {:?}", original);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::snapshot::capture::SnapshotEngine;
    use tempfile::{tempdir, TempDir};

    fn setup() -> Result<(TempDir, BackupStore, PathBuf)> {
        let home = tempdir()?;
        let store =
            BackupStore::from_config(&Config::with_store_dir(home.path().join(".foam_backup")));
        let work = fs::canonicalize(home.path())?.join("work");
        fs::create_dir_all(&work)?;
        Ok((home, store, work))
    }

    fn restored(outcome: ResetOutcome) -> ResetReport {
        match outcome {
            ResetOutcome::Restored(report) => report,
            ResetOutcome::NothingToReset => panic!("expected a restore"),
        }
    }

    #[test]
    fn test_reset_without_store() -> Result<()> {
        let (_home, store, _work) = setup()?;
        let outcome = RestoreEngine::new(&store, true).reset(&[])?;
        assert_eq!(outcome, ResetOutcome::NothingToReset);
        Ok(())
    }

    #[test]
    fn test_reset_refuses_arguments_before_anything_else() -> Result<()> {
        let (_home, store, _work) = setup()?;
        let err = RestoreEngine::new(&store, true)
            .reset(&["somefolder".to_string()])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FoamError>(),
            Some(FoamError::ResetArguments { count: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_reset_restores_changes() -> Result<()> {
        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir_all(proj.join("sub/deeper"))?;
        fs::write(proj.join("a.txt"), "original a")?;
        fs::write(proj.join("sub/b.txt"), "original b")?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        fs::write(proj.join("a.txt"), "changed")?;
        fs::remove_dir_all(proj.join("sub"))?;
        fs::create_dir(proj.join("sub"))?;
        fs::write(proj.join("sub/stray.txt"), "new")?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.errors(), 0, "{:?}", report.issues);
        assert_eq!(report.directories, 2);
        assert_eq!(report.files, 2);
        assert_eq!(fs::read_to_string(proj.join("a.txt"))?, "original a");
        assert_eq!(fs::read_to_string(proj.join("sub/b.txt"))?, "original b");
        assert!(proj.join("sub/deeper").is_dir());
        assert!(!proj.join("sub/stray.txt").exists());
        Ok(())
    }

    #[test]
    fn test_reset_recreates_deleted_root() -> Result<()> {
        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir(&proj)?;
        fs::write(proj.join("a.txt"), "a")?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        fs::remove_dir_all(&proj)?;
        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.errors(), 0);
        assert_eq!(fs::read_to_string(proj.join("a.txt"))?, "a");
        Ok(())
    }

    #[test]
    fn test_reset_is_repeatable() -> Result<()> {
        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir_all(proj.join("dir"))?;
        fs::write(proj.join("dir/f.txt"), "f")?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        let engine = RestoreEngine::new(&store, true);
        let first = restored(engine.reset(&[])?);
        let second = restored(engine.reset(&[])?);

        assert_eq!(first.directories, second.directories);
        assert_eq!(first.files, second.files);
        assert!(second.errors() <= first.errors());
        assert_eq!(fs::read_to_string(proj.join("dir/f.txt"))?, "f");
        Ok(())
    }

    #[test]
    fn test_reset_after_partial_track() -> Result<()> {
        let (_home, store, work) = setup()?;
        let valid = work.join("valid");
        fs::create_dir(&valid)?;
        fs::write(valid.join("data.txt"), "keep me")?;
        SnapshotEngine::new(&store).track(&[&work.join("missing"), &valid])?;

        fs::write(valid.join("data.txt"), "overwritten")?;
        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.errors(), 0);
        assert_eq!(fs::read_to_string(valid.join("data.txt"))?, "keep me");
        assert!(!work.join("missing").exists());
        Ok(())
    }

    #[test]
    fn test_reset_only_restores_latest_generation() -> Result<()> {
        let (_home, store, work) = setup()?;
        let first = work.join("first");
        let second = work.join("second");
        fs::create_dir(&first)?;
        fs::create_dir(&second)?;
        fs::write(first.join("one.txt"), "1")?;
        fs::write(second.join("two.txt"), "2")?;

        let engine = SnapshotEngine::new(&store);
        engine.track(&[&first])?;
        engine.track(&[&second])?;
        fs::remove_file(first.join("one.txt"))?;

        restored(RestoreEngine::new(&store, true).reset(&[])?);
        assert!(!first.join("one.txt").exists());
        assert!(second.join("two.txt").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_scenario_file_and_symlink() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir(&proj)?;
        fs::write(proj.join("a.txt"), "hi")?;
        fs::set_permissions(proj.join("a.txt"), fs::Permissions::from_mode(0o644))?;
        std::os::unix::fs::symlink("a.txt", proj.join("link"))?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        fs::write(proj.join("a.txt"), "bye")?;
        fs::remove_file(proj.join("link"))?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.directories, 0);
        assert_eq!(report.files, 2);
        assert_eq!(report.errors(), 0);
        assert_eq!(fs::read_to_string(proj.join("a.txt"))?, "hi");
        assert_eq!(fs::read_link(proj.join("link"))?, PathBuf::from("a.txt"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_round_trip_with_links() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir_all(proj.join("nested/inner"))?;
        fs::write(proj.join("run.sh"), "#!/bin/sh\n")?;
        fs::set_permissions(proj.join("run.sh"), fs::Permissions::from_mode(0o755))?;
        fs::write(proj.join("nested/inner/data.bin"), [0u8, 159, 146, 150])?;
        std::os::unix::fs::symlink("nested", proj.join("dir_link"))?;
        std::os::unix::fs::symlink("nested/inner/data.bin", proj.join("file_link"))?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        // Replace the directory link with a real directory and vice versa.
        fs::remove_file(proj.join("dir_link"))?;
        fs::create_dir(proj.join("dir_link"))?;
        fs::remove_dir_all(proj.join("nested"))?;
        std::os::unix::fs::symlink("/", proj.join("nested"))?;
        fs::set_permissions(proj.join("run.sh"), fs::Permissions::from_mode(0o600))?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.errors(), 0, "{:?}", report.issues);
        assert_eq!(fs::read_link(proj.join("dir_link"))?, PathBuf::from("nested"));
        assert_eq!(
            fs::read_link(proj.join("file_link"))?,
            PathBuf::from("nested/inner/data.bin")
        );
        assert!(!fs::symlink_metadata(proj.join("nested"))?.file_type().is_symlink());
        assert_eq!(fs::read(proj.join("nested/inner/data.bin"))?, vec![0u8, 159, 146, 150]);
        let mode = fs::metadata(proj.join("run.sh"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_replaces_dangling_symlink() -> Result<()> {
        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir(&proj)?;
        fs::write(proj.join("a.txt"), "hi")?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        fs::remove_file(proj.join("a.txt"))?;
        std::os::unix::fs::symlink("nowhere", proj.join("a.txt"))?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);
        assert_eq!(report.errors(), 0);
        assert!(!fs::symlink_metadata(proj.join("a.txt"))?.file_type().is_symlink());
        assert_eq!(fs::read_to_string(proj.join("a.txt"))?, "hi");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_preserves_read_only() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir_all(proj.join("locked"))?;
        fs::write(proj.join("locked/ro.txt"), "frozen")?;
        fs::set_permissions(proj.join("locked/ro.txt"), fs::Permissions::from_mode(0o444))?;
        fs::set_permissions(proj.join("locked"), fs::Permissions::from_mode(0o555))?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        let engine = RestoreEngine::new(&store, true);
        for _ in 0..2 {
            let report = restored(engine.reset(&[])?);
            assert_eq!(report.errors(), 0, "{:?}", report.issues);
            let file_mode = fs::metadata(proj.join("locked/ro.txt"))?.permissions().mode();
            let dir_mode = fs::metadata(proj.join("locked"))?.permissions().mode();
            assert_eq!(file_mode & 0o777, 0o444);
            assert_eq!(dir_mode & 0o777, 0o555);
        }

        // Leave the tree removable for the temp dir cleanup.
        fs::set_permissions(proj.join("locked"), fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_leaves_copies_writable_when_disabled() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir(&proj)?;
        fs::write(proj.join("ro.txt"), "frozen")?;
        fs::set_permissions(proj.join("ro.txt"), fs::Permissions::from_mode(0o444))?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        let report = restored(RestoreEngine::new(&store, false).reset(&[])?);
        assert_eq!(report.errors(), 0);
        let mode = fs::metadata(proj.join("ro.txt"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_non_utf8_names() -> Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::os::unix::fs::PermissionsExt;

        let (_home, store, work) = setup()?;
        let proj = work.join(OsStr::from_bytes(b"proj\xff"));
        let locked = proj.join(OsStr::from_bytes(b"ro\xfe.txt"));
        fs::create_dir(&proj)?;
        fs::write(proj.join("a.txt"), "hi")?;
        fs::write(&locked, "frozen")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o444))?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        let originals: Vec<PathBuf> = store
            .tracked_roots()?
            .into_iter()
            .map(|r| r.original)
            .collect();
        assert_eq!(originals, vec![proj.clone()]);

        fs::write(proj.join("a.txt"), "bye")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.errors(), 0, "{:?}", report.issues);
        assert_eq!(report.files, 2);
        assert_eq!(fs::read_to_string(proj.join("a.txt"))?, "hi");
        let mode = fs::metadata(&locked)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_skips_special_entries_in_store() -> Result<()> {
        let (_home, store, work) = setup()?;
        let proj = work.join("proj");
        fs::create_dir(&proj)?;
        fs::write(proj.join("a.txt"), "hi")?;
        SnapshotEngine::new(&store).track(&[&proj])?;

        let backup = store.mapper().to_backup_path(&proj)?;
        let _listener = std::os::unix::net::UnixListener::bind(backup.join("sock"))?;

        let report = restored(RestoreEngine::new(&store, true).reset(&[])?);

        assert_eq!(report.files, 1);
        assert_eq!(report.errors(), 0);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::Unsupported);
        assert!(fs::symlink_metadata(proj.join("sock")).is_err());
        Ok(())
    }
}
