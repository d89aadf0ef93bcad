use qrledger_model::{ModelError, QrRecordId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ModelError),

    #[error("content is required")]
    EmptyContent,

    #[error("number {number} already exists")]
    Duplicate { number: String },

    #[error("QR code {0} not found")]
    NotFound(QrRecordId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        RegistryError::Storage(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
