//! Configuration management for Agromate.
//!
//! Settings are layered: built-in defaults, then `config.toml` in the
//! platform config directory, then `AGROMATE_*` environment variables.

mod settings;

pub use settings::{ApiConfig, Config, DashboardConfig, KeyBindings, UiConfig};

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "agromate", "agromate")
        .ok_or_else(|| Error::config("Could not determine project directories"))
}

/// Get the configuration directory path.
pub fn config_dir() -> Result<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the log directory path.
pub fn log_dir() -> Result<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("logs"))
}
