use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrledger_model::{QrRecord, QrRecordId};
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::info;

use super::ports::{NewQrRow, QrCodeRepository};
use crate::error::{RegistryError, Result};

const SELECT_COLUMNS: &str = r#"
    SELECT id, number, name, description, raw_content, created_at, updated_at
    FROM qr_codes
"#;

#[derive(Debug, Clone)]
pub struct PostgresQrCodeRepository {
    pool: PgPool,
}

impl PostgresQrCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url` and run the embedded migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| {
                RegistryError::storage("Failed to connect to PostgreSQL", e)
            })?;

        let repo = Self::new(pool);
        repo.initialize_schema().await?;
        Ok(repo)
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| RegistryError::storage("Migration failed", e))?;
        info!("qr_codes schema is up to date");
        Ok(())
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl QrCodeRepository for PostgresQrCodeRepository {
    async fn insert(&self, row: NewQrRow) -> Result<QrRecord> {
        let number = row.number.clone();
        sqlx::query_as::<_, QrRecord>(
            r#"
            INSERT INTO qr_codes (number, name, description, raw_content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, number, name, description, raw_content, created_at, updated_at
            "#,
        )
        .bind(row.number)
        .bind(row.name)
        .bind(row.description)
        .bind(row.raw_content)
        .bind(row.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RegistryError::Duplicate { number }
            } else {
                RegistryError::storage("Failed to insert QR code", e)
            }
        })
    }

    async fn list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<QrRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, QrRecord>(&sql)
            .bind(limit.map(i64::from))
            .bind(i64::from(offset.unwrap_or(0)))
            .fetch_all(self.pool())
            .await
            .map_err(|e| RegistryError::storage("Failed to list QR codes", e))
    }

    async fn get(&self, id: QrRecordId) -> Result<Option<QrRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        sqlx::query_as::<_, QrRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| RegistryError::storage("Failed to load QR code", e))
    }

    async fn delete(&self, id: QrRecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM qr_codes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                RegistryError::storage("Failed to delete QR code", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_raw_content(
        &self,
        content: &str,
    ) -> Result<Option<QrRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE raw_content = $1 ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, QrRecord>(&sql)
            .bind(content)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                RegistryError::storage("Failed to look up raw content", e)
            })
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<QrRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE number = $1");
        sqlx::query_as::<_, QrRecord>(&sql)
            .bind(number)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| RegistryError::storage("Failed to look up number", e))
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM qr_codes")
            .fetch_one(self.pool())
            .await
            .map_err(|e| RegistryError::storage("Failed to count QR codes", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| RegistryError::storage("Failed to read count", e))?;
        Ok(total.max(0) as u64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM qr_codes WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RegistryError::storage("Failed to count QR codes", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| RegistryError::storage("Failed to read count", e))?;
        Ok(total.max(0) as u64)
    }
}
