//! # Foam Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Foam CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`track`, `reset`) is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level, printed once, and turned into exit code 1
//!
//! Usage errors are handled by Clap itself (exit code 2).
//!
//! ## Examples
//!
//! ```bash
//! # Snapshot a folder, break things, put them back
//! foam track ./my-project
//! foam reset
//!
//! # Run a command with increased verbosity
//! foam -vv reset
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (track, reset)
mod common; // Shared utilities (fs, system)
mod core; // Core infrastructure (errors, config, snapshot engine)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "foam",
    about = "Foam: snapshot folders and reset them to that state",
    long_about = "Track the state of one or more folders, then reset them to exactly that state\n\
                  whenever you like. Only the most recent snapshot is kept.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    Track(commands::track::TrackArgs),
    Reset(commands::reset::ResetArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Track(args) => commands::track::handle_track(args),
        Commands::Reset(args) => commands::reset::handle_reset(args),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
