use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrledger_model::{QrRecord, QrRecordId};
use tokio::sync::RwLock;

use super::ports::{NewQrRow, QrCodeRepository};
use crate::error::{RegistryError, Result};

/// Volatile repository used in dev mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryQrCodeRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    records: Vec<QrRecord>,
}

impl InMemoryQrCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QrCodeRepository for InMemoryQrCodeRepository {
    async fn insert(&self, row: NewQrRow) -> Result<QrRecord> {
        let mut state = self.state.write().await;
        if state.records.iter().any(|r| r.number == row.number) {
            return Err(RegistryError::Duplicate { number: row.number });
        }

        state.next_id += 1;
        let record = QrRecord {
            id: QrRecordId(state.next_id),
            number: row.number,
            name: row.name,
            description: row.description,
            raw_content: row.raw_content,
            created_at: row.created_at,
            updated_at: row.created_at,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<QrRecord>> {
        let state = self.state.read().await;
        let mut records = state.records.clone();
        records.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
        });

        let offset = offset.unwrap_or(0) as usize;
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(records.into_iter().skip(offset).take(limit).collect())
    }

    async fn get(&self, id: QrRecordId) -> Result<Option<QrRecord>> {
        let state = self.state.read().await;
        Ok(state.records.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: QrRecordId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        Ok(state.records.len() != before)
    }

    async fn find_by_raw_content(
        &self,
        content: &str,
    ) -> Result<Option<QrRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .find(|r| r.raw_content == content)
            .cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<QrRecord>> {
        let state = self.state.read().await;
        Ok(state.records.iter().find(|r| r.number == number).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.read().await.records.len() as u64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.created_at >= since)
            .count() as u64)
    }
}
