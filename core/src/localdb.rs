// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod accounts;
mod calendars;
mod mappings;


use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::calendar::{
    Account, Calendar, CalendarRole, EventMapping, Platform, account_id, calendar_id,
};
use crate::localdb::accounts::{AccountRecord, Accounts};
use crate::localdb::calendars::{CalendarRecord, CalendarRow, Calendars};
use crate::localdb::mappings::{MappingRecord, Mappings};
use crate::storage::{Storage, StorageError};

/// File name of the database inside the state directory.
pub const DB_FILENAME: &str = "synccal.db";

/// SQLite-backed [`Storage`].
#[derive(Debug, Clone)]
pub struct LocalDb {
    pool: SqlitePool,

    accounts: Accounts,
    calendars: Calendars,
    mappings: Mappings,
}

/// Request to link a source calendar to a destination calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarLink {
    /// Local name of the source calendar.
    pub name: String,

    /// Account owning the source calendar, as `"{platform}/{name}"`.
    pub source_account_id: String,

    /// Provider id of the source calendar.
    pub source_calendar_id: String,

    /// Account owning the destination calendar.
    pub destination_account_id: String,

    /// Provider id of the destination calendar.
    pub destination_calendar_id: String,

    /// Prefix prepended to mirrored titles.
    pub prefix: String,
}

impl LocalDb {
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    pub async fn open(filename: Option<&Path>) -> Result<Self, StorageError> {
        let (options, pool_options) = if let Some(filename) = filename {
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            let filename = filename
                .to_str()
                .ok_or_else(|| StorageError::InvalidPath(filename.display().to_string()))?;
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            tracing::info!("connecting to in-memory SQLite database");
            // a single connection that never idles out keeps the database alive
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (SqliteConnectOptions::new().in_memory(true), pool_options)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await?;

        tracing::debug!("ensuring tables in the database");
        Ok(LocalDb {
            accounts: Accounts::new(pool.clone()),
            calendars: Calendars::new(pool.clone()),
            mappings: Mappings::new(pool.clone()),
            pool,
        })
    }

    /// Registers an account, or replaces the credentials of an existing one.
    #[tracing::instrument(skip(self, auth))]
    pub async fn add_account(
        &self,
        platform: Platform,
        name: &str,
        auth: &str,
    ) -> Result<Account, StorageError> {
        let record = AccountRecord {
            id: account_id(platform, name),
            platform: platform.to_string(),
            name: name.to_string(),
            auth: auth.to_string(),
        };
        self.accounts.upsert(&record).await?;
        tracing::info!(account = %record.id, "account saved");
        record.try_into()
    }

    /// Lists every registered account.
    pub async fn accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.accounts
            .list()
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Links a source calendar to a destination calendar, creating both rows as needed.
    ///
    /// Relinking an existing source updates its destination and prefix; changing its provider
    /// calendar resets its cursor.
    #[tracing::instrument(skip(self))]
    pub async fn link_calendar(&self, link: &CalendarLink) -> Result<Calendar, StorageError> {
        for id in [&link.source_account_id, &link.destination_account_id] {
            if self.accounts.get(id).await?.is_none() {
                return Err(StorageError::NotFound(format!("account {id}")));
            }
        }

        let destination = CalendarRecord::destination(
            &link.destination_account_id,
            &link.destination_calendar_id,
        );
        let source = CalendarRecord {
            id: calendar_id(&link.source_account_id, &link.name),
            account_id: link.source_account_id.clone(),
            name: link.name.clone(),
            provider_id: link.source_calendar_id.clone(),
            destination_id: Some(destination.id.clone()),
            event_prefix: link.prefix.clone(),
            cursor: String::new(),
        };
        if source.id == destination.id {
            return Err(StorageError::Other(format!(
                "calendar {} cannot be linked to itself",
                source.id
            )));
        }

        let mut tx = self.pool.begin().await?;
        // a calendar keeps the role it was first linked with
        if let Some(Some(feeds)) = Calendars::destination_of(&mut *tx, &destination.id).await? {
            return Err(StorageError::Other(format!(
                "calendar {} is a source feeding {feeds}, not a destination",
                destination.id
            )));
        }
        if let Some(None) = Calendars::destination_of(&mut *tx, &source.id).await? {
            return Err(StorageError::Other(format!(
                "calendar {} is a destination and cannot become a source",
                source.id
            )));
        }
        Calendars::upsert(&mut *tx, &destination).await?;
        Calendars::upsert(&mut *tx, &source).await?;
        tx.commit().await?;

        tracing::info!(source = %source.id, destination = %destination.id, "calendar linked");
        self.calendar(&source.id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("calendar {}", source.id)))
    }

    /// Loads one calendar by its local id.
    pub async fn calendar(&self, id: &str) -> Result<Option<Calendar>, StorageError> {
        match self.calendars.get(id).await? {
            Some(record) => Ok(Some(record.try_into()?)),
            None => Ok(None),
        }
    }

    /// Lists every calendar, destinations first.
    pub async fn calendars(&self) -> Result<Vec<Calendar>, StorageError> {
        self.calendars
            .list()
            .await?
            .into_iter()
            .map(Calendar::try_from)
            .collect()
    }

    /// Lists the mirrored events of a destination calendar.
    pub async fn event_mappings(
        &self,
        destination_id: &str,
    ) -> Result<Vec<EventMapping>, StorageError> {
        let records = self.mappings.list(destination_id).await?;
        Ok(records
            .into_iter()
            .map(|r| EventMapping {
                destination_calendar_id: r.destination_calendar_id,
                destination_event_id: r.destination_event_id,
                source_calendar_id: r.source_calendar_id,
                source_event_id: r.source_event_id,
            })
            .collect())
    }

    /// Counts the mirrored events of a destination calendar.
    pub async fn count_mappings(&self, destination_id: &str) -> Result<i64, StorageError> {
        Ok(self.mappings.count(destination_id).await?)
    }

    pub async fn close(self) -> Result<(), StorageError> {
        tracing::debug!("closing database connection");
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalDb {
    async fn destination_calendars(&self, ids: &[String]) -> Result<Vec<Calendar>, StorageError> {
        let records = if ids.is_empty() {
            self.calendars.destinations().await?
        } else {
            let mut records = Vec::with_capacity(ids.len());
            for id in ids {
                match self.calendars.get(id).await? {
                    Some(record) if record.calendar.destination_id.is_none() => records.push(record),
                    Some(_) => {
                        return Err(StorageError::NotFound(format!(
                            "{id} is not a destination calendar"
                        )));
                    }
                    None => return Err(StorageError::NotFound(format!("calendar {id}"))),
                }
            }
            records
        };

        records.into_iter().map(Calendar::try_from).collect()
    }

    async fn source_calendars(&self, destination_id: &str) -> Result<Vec<Calendar>, StorageError> {
        self.calendars
            .sources(destination_id)
            .await?
            .into_iter()
            .map(Calendar::try_from)
            .collect()
    }

    async fn destination_event_id(
        &self,
        destination: &Calendar,
        source: &Calendar,
        source_event_id: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self
            .mappings
            .destination_event_id(&destination.id, &source.id, source_event_id)
            .await?)
    }

    async fn record_mapping(
        &self,
        destination: &Calendar,
        source: &Calendar,
        destination_event_id: &str,
        source_event_id: &str,
    ) -> Result<(), StorageError> {
        let record = MappingRecord {
            destination_calendar_id: destination.id.clone(),
            destination_event_id: destination_event_id.to_string(),
            source_calendar_id: source.id.clone(),
            source_event_id: source_event_id.to_string(),
        };
        Ok(self.mappings.insert(&record).await?)
    }

    async fn delete_mapping(
        &self,
        destination: &Calendar,
        destination_event_id: &str,
    ) -> Result<(), StorageError> {
        Ok(self
            .mappings
            .delete(&destination.id, destination_event_id)
            .await?)
    }

    async fn save_cursor(&self, source: &Calendar, cursor: &str) -> Result<(), StorageError> {
        let updated = self.calendars.set_cursor(&source.id, cursor).await?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("calendar {}", source.id)));
        }
        Ok(())
    }
}

impl TryFrom<AccountRecord> for Account {
    type Error = StorageError;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        let platform = record.platform.parse().map_err(|e| {
            StorageError::Corrupt(format!("account {}: {e}", record.id))
        })?;
        Ok(Account {
            platform,
            name: record.name,
            auth: record.auth,
        })
    }
}

impl TryFrom<CalendarRow> for Calendar {
    type Error = StorageError;

    fn try_from(row: CalendarRow) -> Result<Self, Self::Error> {
        let CalendarRow {
            calendar,
            account_platform,
            account_name,
            account_auth,
        } = row;
        let account = Account::try_from(AccountRecord {
            id: calendar.account_id,
            platform: account_platform,
            name: account_name,
            auth: account_auth,
        })?;
        let role = match calendar.destination_id {
            Some(destination_id) => CalendarRole::Source {
                destination_id,
                prefix: calendar.event_prefix,
            },
            None => CalendarRole::Destination,
        };
        Ok(Calendar {
            id: calendar.id,
            name: calendar.name,
            provider_id: calendar.provider_id,
            account,
            role,
            cursor: calendar.cursor,
        })
    }
}
