//! Configuration loading for the `huddle` CLI.
//!
//! Settings come from an optional TOML file; command-line flags override it.
//!
//! ```toml
//! [store]
//! path = "data/huddle.db"
//!
//! [reminders]
//! interval_secs = 120
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub store: Option<StoreConfig>,
    pub reminders: Option<ReminderConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ReminderConfig {
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "huddle.toml";

/// Store file used when neither the flag nor the config names one.
pub const DEFAULT_STORE_FILE: &str = "huddle.db";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

impl Config {
    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    /// Reminder polling interval, falling back to the scheduler default.
    pub fn reminder_interval(&self) -> Duration {
        self.reminders
            .as_ref()
            .and_then(|r| r.interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(huddle_engine::reminder::DEFAULT_INTERVAL)
    }

    /// Reject settings that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.reminders.as_ref().and_then(|r| r.interval_secs) {
            anyhow::bail!("reminders.interval_secs must be at least 1");
        }
        Ok(())
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Load the config at `path`, or `huddle.toml` in the working directory when
/// no path is given. A missing default file yields the defaults; a missing
/// explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if explicit {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}
