// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct Accounts {
    pool: SqlitePool,
}

impl Accounts {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, record: &AccountRecord) -> Result<(), sqlx::Error> {
        const SQL: &str = "
INSERT INTO accounts (id, platform, name, auth)
VALUES (?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    auth = excluded.auth;
";

        sqlx::query(SQL)
            .bind(&record.id)
            .bind(&record.platform)
            .bind(&record.name)
            .bind(&record.auth)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<AccountRecord>, sqlx::Error> {
        const SQL: &str = "
SELECT id, platform, name, auth
FROM accounts
WHERE id = ?;
";

        sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<AccountRecord>, sqlx::Error> {
        const SQL: &str = "
SELECT id, platform, name, auth
FROM accounts
ORDER BY id;
";

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRecord {
    pub id: String,
    pub platform: String,
    pub name: String,
    pub auth: String,
}
