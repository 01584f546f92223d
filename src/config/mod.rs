use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::utils::{self, ensure_dir};

const DEFAULT_STORE_FILE: &str = "ledger.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Overrides the directory holding the ledger store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_store_file")]
    pub store_file: String,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_file: Self::default_store_file(),
            log_filter: Self::default_log_filter(),
        }
    }
}

impl Config {
    fn default_store_file() -> String {
        DEFAULT_STORE_FILE.into()
    }

    fn default_log_filter() -> String {
        crate::utils::DEFAULT_LOG_DIRECTIVE.into()
    }

    /// Resolves the JSON store location, relative to `base` unless a data
    /// directory override is configured.
    pub fn store_path(&self, base: &Path) -> PathBuf {
        self.data_dir
            .as_deref()
            .unwrap_or(base)
            .join(&self.store_file)
    }
}

/// Loads and persists [`Config`] under `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(utils::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        ensure_dir(&utils::config_dir_in(&base))?;
        let path = utils::config_file_in(&base);
        Ok(Self { base, path })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        utils::write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
