//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the application
//! configuration from the configuration file (~/.config/confidant/config.toml).

use crate::paths::ConfidantPaths;
use confidant_core::config::AppConfig;
use confidant_core::{ConfidantError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: [&str; 2] = ["CONFIDANT_API_KEY", "OPENAI_API_KEY"];

/// Loads `AppConfig` from a TOML file.
///
/// Responsibilities:
/// - Read and parse config.toml
/// - Fall back to defaults when the file is missing or empty
/// - Fill in the API key from the environment when the file has none
///
/// Does NOT:
/// - Write or create the config file
/// - Apply command-line overrides (the front end does that)
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a ConfigService for the default path (~/.config/confidant/config.toml).
    pub fn new() -> Result<Self> {
        let path = ConfidantPaths::config_file()
            .map_err(|e| ConfidantError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a ConfigService with a custom path (for testing or `--config`).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, applying environment fallbacks.
    ///
    /// # Returns
    ///
    /// - `Ok(AppConfig)`: loaded, or defaults when the file is missing or empty
    /// - `Err(Config)`: the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<AppConfig> {
        let config = self.load_file()?;
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    fn load_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ConfidantError::config(format!(
                "Failed to read configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            ConfidantError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Fills `generation.api_key` from the first set variable in [`API_KEY_ENV_VARS`].
///
/// A key present in the file always wins.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let has_key = config
        .generation
        .api_key
        .as_deref()
        .is_some_and(|k| !k.is_empty());
    if !has_key {
        config.generation.api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.is_empty()));
    }
    config
}
