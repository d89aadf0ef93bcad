use async_trait::async_trait;
use chrono::{Duration, Utc};
use qrledger_model::{
    NewQrRecord, QrRecord, QrRecordId, RegistryStats, VerifyOutcome,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::{ClientError, RegistryService};

#[derive(Debug, Default)]
struct RegistryState {
    next_id: i64,
    records: Vec<QrRecord>,
}

/// Registry kept in memory, with the server's duplicate and lookup rules
/// reduced to exact matches.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRegistry {
    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed(&self, record: QrRecord) {
        let mut state = self.state();
        state.next_id = state.next_id.max(record.id.as_i64());
        state.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistryService for InMemoryRegistry {
    async fn create(&self, record: NewQrRecord) -> Result<QrRecord, ClientError> {
        let mut state = self.state();
        if state.records.iter().any(|r| r.number == record.number) {
            return Err(ClientError::Duplicate(format!(
                "number {} already exists",
                record.number
            )));
        }
        state.next_id += 1;
        let now = Utc::now();
        let created = QrRecord {
            id: QrRecordId(state.next_id),
            raw_content: record.number.clone(),
            number: record.number,
            name: record.name,
            description: record.description,
            created_at: now,
            updated_at: now,
        };
        state.records.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<QrRecord>, ClientError> {
        let mut records = self.state().records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn delete(&self, id: QrRecordId) -> Result<(), ClientError> {
        let mut state = self.state();
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        if state.records.len() == before {
            return Err(ClientError::NotFound(format!("QR code {id} not found")));
        }
        Ok(())
    }

    async fn verify(&self, content: &str) -> Result<VerifyOutcome, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::Validation("content is required".into()));
        }
        let found = self
            .state()
            .records
            .iter()
            .find(|r| r.raw_content == content || r.number == content)
            .cloned();
        Ok(match found {
            Some(record) => VerifyOutcome::found(record),
            None => VerifyOutcome::not_found(content),
        })
    }

    async fn stats(&self) -> Result<RegistryStats, ClientError> {
        let now = Utc::now();
        let state = self.state();
        let since = |days: i64| {
            state
                .records
                .iter()
                .filter(|r| r.created_at >= now - Duration::days(days))
                .count() as u64
        };
        Ok(RegistryStats {
            total_qr_codes: state.records.len() as u64,
            created_today: since(1),
            created_this_week: since(7),
            created_this_month: since(30),
        })
    }
}
