//! Configuration management for the tracker.
//!
//! This module handles the `config.yaml` file inside the data directory,
//! which stores user settings that survive between runs.

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Database location override. `None` means the database lives next to
    /// the config file in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Categories created when a fresh database is initialized.
    #[serde(default = "default_seed_categories")]
    pub seed_categories: Vec<String>,

    /// Whether mutating operations are appended to the activity log.
    #[serde(default)]
    pub log_activity: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            seed_categories: default_seed_categories(),
            log_activity: false,
        }
    }
}

fn default_seed_categories() -> Vec<String> {
    ["Coding", "CI-Stuff", "Personal", "Study", "Errands"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl TrackerConfig {
    /// Load config from a data directory, returning `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(data_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config into a data directory, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(Self::config_path(data_dir), content)?;
        Ok(())
    }

    /// Get the config file path inside a data directory.
    #[must_use]
    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join(paths::CONFIG_FILENAME)
    }

    /// Resolve the database path for a data directory, honoring the override.
    #[must_use]
    pub fn resolve_database_path(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir.join(paths::DATABASE_FILENAME))
    }
}

/// Ensure config exists in a data directory, creating defaults if not.
///
/// Returns the config, either loaded or newly created.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or saved.
pub fn ensure_config_in(data_dir: &Path) -> Result<TrackerConfig> {
    if let Some(config) = TrackerConfig::load_from(data_dir)? {
        return Ok(config);
    }

    let config = TrackerConfig::default();
    config.save_to(data_dir)?;
    Ok(config)
}
