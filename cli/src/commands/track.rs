//! # Foam Track Command
//!
//! File: cli/src/commands/track.rs
//!
//! ## Overview
//!
//! This module implements `foam track`, which has three mutually exclusive
//! forms:
//!
//! - `foam track <FOLDER>...` discards the current snapshot and captures the
//!   given folders as the new one.
//! - `foam track --list` prints the folders in the current snapshot.
//! - `foam track --undo` deletes the snapshot, leaving the folders untouched.
//!
//! Without any argument the command prints its help instead.
//!
//! ## Usage
//!
//! ```bash
//! # Capture two folders (replaces any earlier snapshot)
//! foam track ~/projects/demo /srv/data
//!
//! # Show what is tracked
//! foam track --list
//!
//! # Forget the snapshot
//! foam track --undo
//! ```
//!
use crate::commands::describe_issue;
use crate::core::config;
use crate::core::error::Result;
use crate::core::snapshot::{
    BackupStore, ListOutcome, SnapshotEngine, TrackReport, TrackingRegistry, UndoOutcome,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

/// # Track Arguments (`TrackArgs`)
///
/// Defines the command-line arguments for `foam track`. Folders, `--list` and
/// `--undo` cannot be combined.
#[derive(Parser, Debug)]
#[command(
    about = "Track the current state of folders, or list / clear tracked folders",
    arg_required_else_help = true
)]
pub struct TrackArgs {
    /// List currently tracked folders.
    #[arg(long, conflicts_with_all = ["undo", "folders"])]
    list: bool,

    /// Clear all tracked folders.
    #[arg(long, conflicts_with = "folders")]
    undo: bool,

    /// Folders to track. Any previous snapshot is replaced.
    #[arg(value_name = "FOLDER")]
    folders: Vec<PathBuf>,
}

/// # Handle Track Command (`handle_track`)
///
/// Loads the configuration, opens the backup store and runs the requested
/// form of the command.
///
/// ## Returns
///
/// * `Result<()>`: `Ok(())` once the operation ran to completion, even if
///   individual folders were skipped (those are printed). `Err` for structural
///   failures such as an invalid config or a previous snapshot that could not
///   be cleared.
pub fn handle_track(args: TrackArgs) -> Result<()> {
    info!("Handling track command");
    debug!("Track args: {:?}", args);

    let cfg = config::load_config()?;
    let store = BackupStore::from_config(&cfg);
    debug!("Using backup store {:?}", store.root());

    if args.list {
        print_list(TrackingRegistry::new(&store).list()?);
    } else if args.undo {
        print_undo(TrackingRegistry::new(&store).undo()?);
    } else {
        let report = SnapshotEngine::new(&store).track(&args.folders)?;
        debug!("Track finished with {} error(s)", report.errors());
        print_track(&report);
    }
    Ok(())
}

fn print_track(report: &TrackReport) {
    for root in &report.captured {
        println!(
            "Tracked folder: {} -> {}",
            root.original.display(),
            root.backup.display()
        );
    }
    for issue in &report.issues {
        println!("{}", describe_issue(issue));
    }
    println!("Folders have been tracked.");
}

fn print_list(outcome: ListOutcome) {
    match outcome {
        ListOutcome::Tracked(folders) if !folders.is_empty() => {
            println!("Currently tracked folders:");
            for folder in folders {
                println!("  • {}", folder.display());
            }
        }
        _ => println!("No folders are currently being tracked."),
    }
}

fn print_undo(outcome: UndoOutcome) {
    match outcome {
        UndoOutcome::NothingTracked => println!("No folders are currently being tracked."),
        UndoOutcome::Cleared(issues) if issues.is_empty() => {
            println!("Successfully cleared all tracked folders.")
        }
        UndoOutcome::Cleared(issues) => {
            for issue in &issues {
                println!("{}", describe_issue(issue));
            }
            println!(
                "Cleared tracked folders, but {} item(s) could not be removed.",
                issues.len()
            );
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_args_folders() {
        let args = TrackArgs::try_parse_from(["track", "a", "b"]).unwrap();
        assert_eq!(args.folders, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert!(!args.list);
        assert!(!args.undo);
    }

    #[test]
    fn test_track_args_list_and_undo() {
        assert!(TrackArgs::try_parse_from(["track", "--list"]).unwrap().list);
        assert!(TrackArgs::try_parse_from(["track", "--undo"]).unwrap().undo);
    }

    #[test]
    fn test_track_args_are_exclusive() {
        assert!(TrackArgs::try_parse_from(["track", "--list", "--undo"]).is_err());
        assert!(TrackArgs::try_parse_from(["track", "--list", "dir"]).is_err());
        assert!(TrackArgs::try_parse_from(["track", "--undo", "dir"]).is_err());
    }

    #[test]
    fn test_track_args_empty_shows_help() {
        let err = TrackArgs::try_parse_from(["track"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
