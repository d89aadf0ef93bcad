use serde::{Deserialize, Serialize};

use crate::record::QrRecord;

pub const FOUND_MESSAGE: &str = "QR code found";
pub const NOT_FOUND_MESSAGE: &str = "QR code not found";

/// Body of `POST /api/qrcodes/verify/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub content: String,
}

impl VerifyRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Result of looking a scanned payload up in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub found: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<QrRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl VerifyOutcome {
    pub fn found(record: QrRecord) -> Self {
        Self {
            found: true,
            message: FOUND_MESSAGE.to_string(),
            qr_code: Some(record),
            content: None,
        }
    }

    pub fn not_found(content: impl Into<String>) -> Self {
        Self {
            found: false,
            message: NOT_FOUND_MESSAGE.to_string(),
            qr_code: None,
            content: Some(content.into()),
        }
    }

    /// The matched record, only when the outcome says it was found.
    pub fn record(&self) -> Option<&QrRecord> {
        if self.found { self.qr_code.as_ref() } else { None }
    }
}
