// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use synccal_core::LocalDb;
use tokio::fs;

use crate::config::Config;

/// The configuration and the open database shared by every command.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub db: LocalDb,
}

impl Session {
    /// Opens the database in the configured state directory, creating the directory if needed.
    pub async fn open(config: Config) -> Result<Self, Box<dyn Error>> {
        if let Some(dir) = &config.core.state_dir {
            fs::create_dir_all(dir).await.map_err(|e| {
                format!("Failed to create state directory {}: {}", dir.display(), e)
            })?;
        }

        let db = LocalDb::open(config.core.db_path().as_deref()).await?;
        Ok(Self { config, db })
    }

    pub async fn close(self) -> Result<(), Box<dyn Error>> {
        self.db.close().await?;
        Ok(())
    }
}
