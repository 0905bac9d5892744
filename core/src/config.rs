// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::EventFilter;
use crate::localdb::DB_FILENAME;
use crate::syncer::SyncOptions;

/// The name of the application.
pub const APP_NAME: &str = "synccal";

/// Core configuration, the `[core]` table of the configuration file.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for storing application state. Defaults to `$XDG_STATE_HOME/synccal`.
    pub state_dir: Option<PathBuf>,

    /// How many days back a first or forced sync starts.
    pub lookback_days: u32,

    /// How many days ahead a forced purge of the destination reaches.
    pub future_horizon_days: u32,

    /// Pause after a full listing of a source calendar, in seconds.
    pub pacing_delay_secs: u64,

    /// How many destination calendars are synced at the same time.
    pub concurrency: usize,

    /// Default filter rules.
    pub filter: EventFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: None,
            lookback_days: 7,
            future_horizon_days: 30,
            pacing_delay_secs: 0,
            concurrency: 1,
            filter: EventFilter::default(),
        }
    }
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        match &self.state_dir {
            Some(a) => self.state_dir = Some(expand_path(a)?),
            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        };

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the database file, or `None` for an in-memory database.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|dir| dir.join(DB_FILENAME))
    }

    /// Engine options derived from this configuration.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            lookback_days: self.lookback_days,
            future_horizon_days: self.future_horizon_days,
            pacing_delay: Duration::from_secs(self.pacing_delay_secs),
            concurrency: self.concurrency,
        }
    }
}

/// Errors in the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A path that cannot be expanded.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A well-known directory that could not be located.
    #[error("{0} directory not found")]
    MissingDirectory(&'static str),

    /// A value out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Handle tilde (~) and environment variables in the path
pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path
        .to_str()
        .ok_or_else(|| ConfigError::InvalidPath(path.display().to_string()))?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    // Handle state directories
    let state_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_STATE_HOME/", "${XDG_STATE_HOME}/"]
    } else {
        &[]
    };
    for prefix in state_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_state_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::MissingDirectory("User-specific home"))
}

/// Returns the user-specific configuration directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or(ConfigError::MissingDirectory("User-specific config"))
}

fn get_state_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or(ConfigError::MissingDirectory("User-specific state"))
}
