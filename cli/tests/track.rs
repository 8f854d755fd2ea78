//! # Foam CLI Track Integration Tests
//!
//! File: cli/tests/track.rs
//!
//! ## Overview
//!
//! Integration tests for `foam track`, `foam track --list` and
//! `foam track --undo`, run against a temporary home directory.
//!
#![cfg(unix)]

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_track_without_arguments_shows_help() {
    let home = tempdir().unwrap();
    foam_in(home.path()).arg("track").assert().failure().code(2);
    assert!(!home.path().join(".foam_backup").exists());
}

#[test]
fn test_track_folder() {
    let home = tempdir().unwrap();
    let proj = work_dir(home.path(), "proj");
    fs::write(proj.join("a.txt"), "hi").unwrap();

    foam_in(home.path())
        .arg("track")
        .arg(&proj)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Tracked folder: {} ->",
            proj.display()
        )))
        .stdout(predicate::str::contains("Folders have been tracked."));

    assert!(home.path().join(".foam_backup").is_dir());
}

#[test]
fn test_track_reports_missing_folder_and_continues() {
    let home = tempdir().unwrap();
    let proj = work_dir(home.path(), "proj");
    let missing = home.path().join("work/missing");

    foam_in(home.path())
        .arg("track")
        .arg(&missing)
        .arg(&proj)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Folder {} does not exist or is not a directory.",
            missing.display()
        )))
        .stdout(predicate::str::contains(format!(
            "Tracked folder: {}",
            proj.display()
        )));
}

#[test]
fn test_track_list_and_undo() {
    let home = tempdir().unwrap();
    let proj = work_dir(home.path(), "proj");

    foam_in(home.path())
        .args(["track", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No folders are currently being tracked."));

    foam_in(home.path()).arg("track").arg(&proj).assert().success();

    foam_in(home.path())
        .args(["track", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Currently tracked folders:"))
        .stdout(predicate::str::contains(format!("  • {}", proj.display())));

    foam_in(home.path())
        .args(["track", "--undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully cleared all tracked folders."));

    foam_in(home.path())
        .args(["track", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No folders are currently being tracked."));
    assert!(proj.is_dir(), "undo must not touch tracked folders");
}

#[test]
fn test_track_undo_without_snapshot() {
    let home = tempdir().unwrap();
    foam_in(home.path())
        .args(["track", "--undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No folders are currently being tracked."));
}

#[test]
fn test_track_flags_are_exclusive() {
    let home = tempdir().unwrap();
    foam_in(home.path())
        .args(["track", "--list", "--undo"])
        .assert()
        .failure()
        .code(2);
    foam_in(home.path())
        .args(["track", "--undo", "somewhere"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_track_replaces_previous_snapshot() {
    let home = tempdir().unwrap();
    let first = work_dir(home.path(), "first");
    let second = work_dir(home.path(), "second");

    foam_in(home.path()).arg("track").arg(&first).assert().success();
    foam_in(home.path()).arg("track").arg(&second).assert().success();

    foam_in(home.path())
        .args(["track", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(second.display().to_string()))
        .stdout(predicate::str::contains(first.display().to_string()).not());
}

#[test]
fn test_track_uses_configured_store() {
    let home = tempdir().unwrap();
    let proj = work_dir(home.path(), "proj");
    fs::write(
        home.path().join(".foam.toml"),
        "[store]\ndirectory = \"~/snapshots\"\n",
    )
    .unwrap();

    foam_in(home.path()).arg("track").arg(&proj).assert().success();

    assert!(home.path().join("snapshots").is_dir());
    assert!(!home.path().join(".foam_backup").exists());
}

#[test]
fn test_track_rejects_invalid_config() {
    let home = tempdir().unwrap();
    let proj = work_dir(home.path(), "proj");
    fs::write(home.path().join(".foam.toml"), "[store]\nlocation = \"x\"\n").unwrap();

    foam_in(home.path())
        .arg("track")
        .arg(&proj)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
