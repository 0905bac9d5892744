// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tokio::fs;

use synccal_core::{APP_NAME, Config as CoreConfig, get_config_dir};
use synccal_google::GoogleConfig;

const SYNCCAL_CONFIG_ENV: &str = "SYNCCAL_CONFIG";

/// Locates, reads and normalizes the configuration.
///
/// The path comes from `--config`, then `$SYNCCAL_CONFIG`, then the user configuration directory.
/// A missing file in the user configuration directory yields the defaults.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(SYNCCAL_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let path = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            let mut config = Config::default();
            config.normalize()?;
            return Ok(config);
        }
        path
    };

    let mut config = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<Config>()
        .map_err(|e| format!("Failed to parse config file at {}: {}", path.display(), e))?;
    config.normalize()?;
    Ok(config)
}

/// Configuration for the synccal application.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine, storage and filter settings.
    pub core: CoreConfig,

    /// Google Calendar API settings.
    pub google: GoogleConfig,
}

impl Config {
    fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        self.core.normalize()?;
        if self.google.max_attempts == 0 {
            return Err("google.max_attempts must be at least 1".into());
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
