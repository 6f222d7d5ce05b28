//! Unified path management for confidant configuration and data files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::PathBuf;

const APP_NAME: &str = "confidant";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config or data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for confidant.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/confidant/           # Config directory
/// ├── config.toml                # Application configuration
/// └── logs/                      # Application logs
///     └── confidant.log.YYYY-MM-DD
///
/// ~/.local/share/confidant/      # Data directory
/// └── user_data/                 # One directory per user
///     └── <user_id>/
///         ├── history/           # Transcripts
///         └── portrait/          # Portraits
/// ```
pub struct ConfidantPaths;

impl ConfidantPaths {
    /// Returns the confidant configuration directory (e.g., `~/.config/confidant/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the confidant data directory (e.g., `~/.local/share/confidant/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Returns the default root under which each user gets a directory.
    pub fn user_data_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("user_data"))
    }
}
