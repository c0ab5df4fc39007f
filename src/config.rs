//! Configuration file discovery and loading.

pub use bookstore_common::config::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["./bookstore.toml", "~/.config/bookstore/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match find_config(DEFAULT_CONFIG_PATHS) {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            load_config(&path)
        }
        None => {
            tracing::debug!("No config file found; using defaults");
            Ok(Config::default())
        }
    }
}

/// First existing file among `search_paths`, with `~` expanded.
pub fn find_config(search_paths: &[&str]) -> Option<PathBuf> {
    search_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
        .find(|p| p.exists())
}
