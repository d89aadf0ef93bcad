use async_trait::async_trait;
use qrledger_model::{
    NewQrRecord, QrRecord, QrRecordId, RegistryStats, VerifyOutcome,
};

use super::error::ClientError;

/// Operations the page controller needs from the registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryService: Send + Sync {
    async fn create(&self, record: NewQrRecord)
    -> Result<QrRecord, ClientError>;

    async fn list(&self) -> Result<Vec<QrRecord>, ClientError>;

    async fn delete(&self, id: QrRecordId) -> Result<(), ClientError>;

    async fn verify(&self, content: &str) -> Result<VerifyOutcome, ClientError>;

    async fn stats(&self) -> Result<RegistryStats, ClientError>;
}
