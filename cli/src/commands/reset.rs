//! # Foam Reset Command
//!
//! File: cli/src/commands/reset.rs
//!
//! ## Overview
//!
//! This module implements `foam reset`, which restores every tracked folder to
//! the state captured by the last `foam track`. Files changed since then are
//! overwritten, deleted files and symlinks come back, and stale content inside
//! tracked subdirectories is removed. The snapshot itself is kept, so `reset`
//! can be run again later.
//!
//! The command takes no folder arguments: a reset always covers the whole
//! snapshot. Arguments are still accepted by the parser so that the command
//! can explain this instead of printing a generic usage error.
//!
//! ## Usage
//!
//! ```bash
//! foam reset
//! ```
//!
use crate::commands::describe_issue;
use crate::core::config;
use crate::core::error::Result;
use crate::core::snapshot::{BackupStore, ResetOutcome, RestoreEngine};
use clap::Parser;
use tracing::{debug, info};

/// # Reset Arguments (`ResetArgs`)
#[derive(Parser, Debug)]
#[command(about = "Reset all tracked folders to their tracked state")]
pub struct ResetArgs {
    /// Not accepted; present so the command can refuse them explicitly.
    #[arg(hide = true, value_name = "FOLDER")]
    folders: Vec<String>,
}

/// # Handle Reset Command (`handle_reset`)
///
/// Restores the whole snapshot and prints a summary of what was restored.
///
/// ## Returns
///
/// * `Result<()>`: `Ok(())` when the restore pass ran, including passes with
///   per-entry errors (those are printed and counted). `Err` with
///   `FoamError::ResetArguments` when folder arguments were given.
pub fn handle_reset(args: ResetArgs) -> Result<()> {
    info!("Handling reset command");
    debug!("Reset args: {:?}", args);

    let cfg = config::load_config()?;
    let store = BackupStore::from_config(&cfg);
    let engine = RestoreEngine::new(&store, cfg.restore.preserve_read_only);

    match engine.reset(&args.folders)? {
        ResetOutcome::NothingToReset => println!("No tracked folders to reset."),
        ResetOutcome::Restored(report) => {
            for issue in &report.issues {
                println!("{}", describe_issue(issue));
            }
            println!("Reset complete:");
            println!("  • Restored {} directories", report.directories);
            println!("  • Restored {} files", report.files);
            let errors = report.errors();
            if errors > 0 {
                println!("  • Encountered {} errors", errors);
            }
        }
    }
    Ok(())
}
