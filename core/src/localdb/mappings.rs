// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct Mappings {
    pool: SqlitePool,
}

impl Mappings {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a mapping. Both sides are unique, so mapping an event twice fails.
    pub async fn insert(&self, record: &MappingRecord) -> Result<(), sqlx::Error> {
        const SQL: &str = "
INSERT INTO event_mappings
    (destination_calendar_id, destination_event_id, source_calendar_id, source_event_id)
VALUES (?, ?, ?, ?);
";

        sqlx::query(SQL)
            .bind(&record.destination_calendar_id)
            .bind(&record.destination_event_id)
            .bind(&record.source_calendar_id)
            .bind(&record.source_event_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn destination_event_id(
        &self,
        destination_calendar_id: &str,
        source_calendar_id: &str,
        source_event_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        const SQL: &str = "
SELECT destination_event_id
FROM event_mappings
WHERE destination_calendar_id = ? AND source_calendar_id = ? AND source_event_id = ?;
";

        sqlx::query_scalar(SQL)
            .bind(destination_calendar_id)
            .bind(source_calendar_id)
            .bind(source_event_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete(
        &self,
        destination_calendar_id: &str,
        destination_event_id: &str,
    ) -> Result<(), sqlx::Error> {
        const SQL: &str = "
DELETE FROM event_mappings
WHERE destination_calendar_id = ? AND destination_event_id = ?;
";

        sqlx::query(SQL)
            .bind(destination_calendar_id)
            .bind(destination_event_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list(
        &self,
        destination_calendar_id: &str,
    ) -> Result<Vec<MappingRecord>, sqlx::Error> {
        const SQL: &str = "
SELECT destination_calendar_id, destination_event_id, source_calendar_id, source_event_id
FROM event_mappings
WHERE destination_calendar_id = ?
ORDER BY source_calendar_id, source_event_id;
";

        sqlx::query_as(SQL)
            .bind(destination_calendar_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count(&self, destination_calendar_id: &str) -> Result<i64, sqlx::Error> {
        const SQL: &str = "SELECT COUNT(*) FROM event_mappings WHERE destination_calendar_id = ?;";

        sqlx::query_scalar(SQL)
            .bind(destination_calendar_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MappingRecord {
    pub destination_calendar_id: String,
    pub destination_event_id: String,
    pub source_calendar_id: String,
    pub source_event_id: String,
}
