//! Durable storage for [`Config`].
//!
//! The monitor reloads through [`ConfigStore::load`] on every tick, so edits
//! made by the operator (or by hand in the JSON file) are picked up within one
//! poll interval without any reload signal.

use std::path::{Path, PathBuf};

use crate::config::{Config, APP_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV, LOG_FILE_NAME};
use crate::error::ConfigError;

/// Key/value settings storage with create-default-on-first-use semantics.
pub trait ConfigStore: Send + Sync {
    /// Load the current settings, persisting and returning the defaults if none exist.
    fn load(&self) -> Result<Config, ConfigError>;

    /// Validate and persist `config`.
    fn save(&self, config: &Config) -> Result<(), ConfigError>;

    /// Backing file, if the store has one.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Pretty-printed JSON file store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the config path: explicit override, then `LINKWATCH_CONFIG`,
    /// then `<config_dir>/linkwatch/config.json`, falling back to the working dir.
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(path);
        }
        match dirs::config_dir() {
            Some(dir) => dir.join(APP_NAME).join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log file kept in the same directory as the config file.
    pub fn log_path(&self) -> PathBuf {
        self.path.with_file_name(LOG_FILE_NAME)
    }

    fn write(&self, config: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        // Write-then-rename so a concurrent reader never sees a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            let config = Config::default();
            self.write(&config)?;
            tracing::info!("Created default config at {}", self.path.display());
            return Ok(config);
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        self.write(config)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
