use std::sync::Arc;

use chrono::{DateTime, Utc};
use qrledger_model::{
    NewQrRecord, QrRecord, QrRecordId, RegistryStats, VerifyOutcome,
};
use tracing::{debug, info};

use crate::content::extract_number_from_content;
use crate::database::{NewQrRow, QrCodeRepository};
use crate::error::{RegistryError, Result};
use crate::stats::StatsWindow;

/// Registry operations shared by every transport.
#[derive(Clone)]
pub struct Registry {
    repo: Arc<dyn QrCodeRepository>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(repo: Arc<dyn QrCodeRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn QrCodeRepository> {
        &self.repo
    }

    pub async fn create(&self, input: NewQrRecord) -> Result<QrRecord> {
        self.create_at(input, Utc::now()).await
    }

    /// Create a record stamped with `now`. The raw content of a new record
    /// is its number.
    pub async fn create_at(
        &self,
        input: NewQrRecord,
        now: DateTime<Utc>,
    ) -> Result<QrRecord> {
        let input = input.normalized()?;

        if self.repo.find_by_number(&input.number).await?.is_some() {
            return Err(RegistryError::Duplicate {
                number: input.number,
            });
        }

        let record = self
            .repo
            .insert(NewQrRow {
                raw_content: input.number.clone(),
                number: input.number,
                name: input.name,
                description: input.description,
                created_at: now,
            })
            .await?;

        info!(id = %record.id, number = %record.number, "QR code created");
        Ok(record)
    }

    pub async fn list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<QrRecord>> {
        self.repo.list(limit, offset).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.repo.count().await
    }

    pub async fn get(&self, id: QrRecordId) -> Result<QrRecord> {
        self.repo
            .get(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    pub async fn delete(&self, id: QrRecordId) -> Result<()> {
        if self.repo.delete(id).await? {
            info!(%id, "QR code deleted");
            Ok(())
        } else {
            Err(RegistryError::NotFound(id))
        }
    }

    /// Look a scanned payload up: exact raw content first, then the number
    /// extracted from it.
    pub async fn verify(&self, content: &str) -> Result<VerifyOutcome> {
        let content = content.trim();
        if content.is_empty() {
            return Err(RegistryError::EmptyContent);
        }

        if let Some(record) = self.find_by_content(content).await? {
            debug!(id = %record.id, "scanned content matched");
            return Ok(VerifyOutcome::found(record));
        }

        debug!("scanned content did not match any record");
        Ok(VerifyOutcome::not_found(content))
    }

    async fn find_by_content(&self, content: &str) -> Result<Option<QrRecord>> {
        if let Some(record) = self.repo.find_by_raw_content(content).await? {
            return Ok(Some(record));
        }

        match extract_number_from_content(content) {
            Some(number) => self.repo.find_by_number(&number).await,
            None => Ok(None),
        }
    }

    pub async fn stats(&self) -> Result<RegistryStats> {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<RegistryStats> {
        let window = StatsWindow::at(now);
        Ok(RegistryStats {
            total_qr_codes: self.repo.count().await?,
            created_today: self
                .repo
                .count_created_since(window.today_start)
                .await?,
            created_this_week: self
                .repo
                .count_created_since(window.week_start)
                .await?,
            created_this_month: self
                .repo
                .count_created_since(window.month_start)
                .await?,
        })
    }
}
