use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrledger_model::{QrRecord, QrRecordId};

use crate::error::Result;

/// Row handed to [`QrCodeRepository::insert`]; fields are already
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQrRow {
    pub number: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub raw_content: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait QrCodeRepository: Send + Sync {
    /// Store a new record. Fails with `RegistryError::Duplicate` when the
    /// number is taken.
    async fn insert(&self, row: NewQrRow) -> Result<QrRecord>;

    /// Records ordered newest first.
    async fn list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<QrRecord>>;

    async fn get(&self, id: QrRecordId) -> Result<Option<QrRecord>>;

    /// Returns `false` when no record had that id.
    async fn delete(&self, id: QrRecordId) -> Result<bool>;

    async fn find_by_raw_content(&self, content: &str)
    -> Result<Option<QrRecord>>;

    async fn find_by_number(&self, number: &str) -> Result<Option<QrRecord>>;

    async fn count(&self) -> Result<u64>;

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64>;
}
