//! # Foam Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads the optional user configuration for Foam and exposes the
//! values the snapshot engine needs, most importantly the location of the
//! backup store. The store location is plain configuration handed to each
//! engine component at construction; nothing in the engine reads it from a
//! global.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. `~/.foam.toml`, if present
//! 2. Default values defined in the code (store at `~/.foam_backup`)
//!
//! Both sources derive from the home directory only. Paths are expanded
//! (`~` to home directory) and validated before use.
//!
//! ## Examples
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let store_root = cfg.store_dir();
//! ```
//!
use crate::core::error::{FoamError, Result};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Name of the user configuration file, looked up in the home directory.
pub const CONFIG_FILENAME: &str = ".foam.toml";
/// Name of the backup store directory, created in the home directory by default.
pub const DEFAULT_STORE_DIRNAME: &str = ".foam_backup";

/// Represents the main configuration structure, loaded from TOML.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub restore: RestoreConfig,
}

/// Where the single snapshot lives.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store directory (can use ~). `None` selects `~/.foam_backup`.
    #[serde(default)]
    pub directory: Option<String>,
}

/// Options for `foam reset`.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    /// Clear the write bit again on objects that were read-only when tracked.
    #[serde(default = "default_preserve_read_only")]
    pub preserve_read_only: bool,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            preserve_read_only: default_preserve_read_only(),
        }
    }
}

fn default_preserve_read_only() -> bool {
    true
}

impl Config {
    /// Builds a configuration that places the store at `dir`, with every other
    /// setting at its default.
    #[allow(dead_code)] // The CLI always loads from file; tests build configs directly.
    pub fn with_store_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig {
                directory: Some(dir.into().to_string_lossy().into_owned()),
            },
            ..Default::default()
        }
    }

    /// Absolute path of the backup store.
    ///
    /// Falls back to `~/.foam_backup`; if even the home directory is unknown
    /// the store is placed relative to the working directory.
    pub fn store_dir(&self) -> PathBuf {
        match &self.store.directory {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => default_store_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_STORE_DIRNAME)
}

/// Loads `~/.foam.toml` (if any), expands and validates it.
pub fn load_config() -> Result<Config> {
    let mut config = match dirs::home_dir().map(|home| home.join(CONFIG_FILENAME)) {
        Some(path) if path.is_file() => {
            info!("Loading user configuration from: {}", path.display());
            load_config_from_path(&path)?
        }
        Some(path) => {
            debug!("User configuration file not found at {}", path.display());
            Config::default()
        }
        None => {
            debug!("Could not determine home directory, using defaults.");
            Config::default()
        }
    };
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content).map_err(|e| {
        anyhow!(FoamError::Config(format!(
            "Failed to parse TOML from file {}: {}",
            path.display(),
            e
        )))
    })
}

fn expand_config_paths(config: &mut Config) {
    if let Some(dir) = config.store.directory.as_mut() {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded store directory: {}", dir);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if let Some(dir) = &config.store.directory {
        if dir.trim().is_empty() {
            return Err(anyhow!(FoamError::Config(
                "Store directory cannot be empty.".to_string()
            )));
        }
    }
    let store = config.store_dir();
    if store.exists() && !store.is_dir() {
        return Err(anyhow!(FoamError::Config(format!(
            "Configured store path '{}' exists but is not a directory.",
            store.display()
        ))));
    }
    Ok(())
}
