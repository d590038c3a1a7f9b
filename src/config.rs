//! Configuration loading and management
//!
//! Handles parsing of `.taskdeck.toml` configuration files.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = ".taskdeck.toml";

const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Store location and write behaviour
    #[serde(default)]
    pub store: StoreConfig,

    /// Change watcher configuration
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `tasks.json` and `projects.json`
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// How long a writer waits for another writer's lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Watcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Quiet period before a burst of file events becomes one notification
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `.taskdeck.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if let Some(dir) = &self.store.dir {
            if dir.as_os_str().is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "store.dir cannot be empty".to_string(),
                ));
            }
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.watch.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(crate::error::Error::InvalidConfig(format!(
                "watch.debounce_ms must be <= {MAX_DEBOUNCE_MS}"
            )));
        }
        Ok(())
    }
}
