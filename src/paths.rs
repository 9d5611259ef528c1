//! XDG-style path utilities for configuration and data directories.
//!
//! XDG Base Directory conventions are preferred over OS-specific locations
//! on every platform.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "lingo";

/// Returns the configuration directory for lingo.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/lingo` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/lingo` otherwise
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Returns the data directory for lingo, where the history database lives.
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/lingo` if `XDG_DATA_HOME` is set
/// 2. `~/.local/share/lingo` otherwise
pub fn data_dir() -> Result<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn history_db() -> Result<PathBuf> {
    Ok(data_dir()?.join("history.db"))
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var(var)
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }

    let mut dir = dirs::home_dir().context("Failed to determine home directory")?;
    dir.extend(fallback);
    Ok(dir.join(APP_DIR))
}
