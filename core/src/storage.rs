// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::calendar::Calendar;

/// Durable state of the sync engine: calendar topology, event mappings and cursors.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads the destination calendars with the given ids, or all of them if `ids` is empty.
    async fn destination_calendars(&self, ids: &[String]) -> Result<Vec<Calendar>, StorageError>;

    /// Loads the source calendars feeding a destination.
    async fn source_calendars(&self, destination_id: &str) -> Result<Vec<Calendar>, StorageError>;

    /// Finds the destination event mirroring `source_event_id` of `source`.
    async fn destination_event_id(
        &self,
        destination: &Calendar,
        source: &Calendar,
        source_event_id: &str,
    ) -> Result<Option<String>, StorageError>;

    /// Records that `destination_event_id` mirrors `source_event_id`.
    ///
    /// Fails if either side is already mapped.
    async fn record_mapping(
        &self,
        destination: &Calendar,
        source: &Calendar,
        destination_event_id: &str,
        source_event_id: &str,
    ) -> Result<(), StorageError>;

    /// Forgets the mapping of a destination event. Missing mappings are not an error.
    async fn delete_mapping(
        &self,
        destination: &Calendar,
        destination_event_id: &str,
    ) -> Result<(), StorageError>;

    /// Persists the cursor of a source calendar.
    async fn save_cursor(&self, source: &Calendar, cursor: &str) -> Result<(), StorageError>;
}

/// Errors raised by a [`Storage`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database failure.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Stored data that cannot be interpreted.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// A referenced account or calendar does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A database path that cannot be used.
    #[error("invalid database path: {0}")]
    InvalidPath(String),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}
