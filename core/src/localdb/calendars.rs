// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::{SqliteExecutor, SqlitePool};

use crate::calendar::calendar_id;

const SELECT_ROWS: &str = "
SELECT c.id, c.account_id, c.name, c.provider_id, c.destination_id, c.event_prefix, c.cursor,
       a.platform AS account_platform, a.name AS account_name, a.auth AS account_auth
FROM calendars c
JOIN accounts a ON a.id = c.account_id
";

#[derive(Debug, Clone)]
pub struct Calendars {
    pool: SqlitePool,
}

impl Calendars {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or relinks a calendar. The cursor is reset when the provider calendar changes.
    pub async fn upsert<'e, E>(executor: E, record: &CalendarRecord) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        const SQL: &str = "
INSERT INTO calendars (id, account_id, name, provider_id, destination_id, event_prefix, cursor)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    cursor = CASE WHEN calendars.provider_id = excluded.provider_id
                  THEN calendars.cursor ELSE '' END,
    provider_id = excluded.provider_id,
    destination_id = excluded.destination_id,
    event_prefix = excluded.event_prefix;
";

        sqlx::query(SQL)
            .bind(&record.id)
            .bind(&record.account_id)
            .bind(&record.name)
            .bind(&record.provider_id)
            .bind(&record.destination_id)
            .bind(&record.event_prefix)
            .bind(&record.cursor)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// The `destination_id` of an existing calendar: `Some(None)` for a destination,
    /// `None` when no such calendar exists.
    pub async fn destination_of<'e, E>(
        executor: E,
        id: &str,
    ) -> Result<Option<Option<String>>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        const SQL: &str = "SELECT destination_id FROM calendars WHERE id = ?;";

        sqlx::query_scalar::<_, Option<String>>(SQL)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<CalendarRow>, sqlx::Error> {
        let sql = format!("{SELECT_ROWS} WHERE c.id = ?;");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<CalendarRow>, sqlx::Error> {
        let sql = format!("{SELECT_ROWS} ORDER BY c.destination_id IS NOT NULL, c.id;");
        sqlx::query_as(&sql).fetch_all(&self.pool).await
    }

    pub async fn destinations(&self) -> Result<Vec<CalendarRow>, sqlx::Error> {
        let sql = format!("{SELECT_ROWS} WHERE c.destination_id IS NULL ORDER BY c.id;");
        sqlx::query_as(&sql).fetch_all(&self.pool).await
    }

    pub async fn sources(&self, destination_id: &str) -> Result<Vec<CalendarRow>, sqlx::Error> {
        let sql = format!("{SELECT_ROWS} WHERE c.destination_id = ? ORDER BY c.id;");
        sqlx::query_as(&sql)
            .bind(destination_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Returns the number of updated rows.
    pub async fn set_cursor(&self, id: &str, cursor: &str) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE calendars SET cursor = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(cursor)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalendarRecord {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub provider_id: String,
    pub destination_id: Option<String>,
    pub event_prefix: String,
    pub cursor: String,
}

impl CalendarRecord {
    /// A destination calendar named after its provider id.
    pub fn destination(account_id: &str, provider_id: &str) -> Self {
        Self {
            id: calendar_id(account_id, provider_id),
            account_id: account_id.to_string(),
            name: provider_id.to_string(),
            provider_id: provider_id.to_string(),
            destination_id: None,
            event_prefix: String::new(),
            cursor: String::new(),
        }
    }
}

/// A calendar joined with its account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalendarRow {
    #[sqlx(flatten)]
    pub calendar: CalendarRecord,
    pub account_platform: String,
    pub account_name: String,
    pub account_auth: String,
}
