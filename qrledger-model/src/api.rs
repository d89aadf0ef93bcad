//! Wire envelopes for the registry REST surface.

use serde::{Deserialize, Serialize};

use crate::record::QrRecord;

pub const CREATED_MESSAGE: &str = "QR code created successfully";

/// Response of a successful `POST /api/qrcodes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    #[serde(default)]
    pub message: String,
    pub qr_code: QrRecord,
}

/// One page of records, returned when the list is requested with
/// `limit`/`offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub count: u64,
    pub results: Vec<QrRecord>,
}

/// Query string accepted by `GET /api/qrcodes/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    pub fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

/// The list endpoint answers with either a bare array or a `{results}`
/// object; clients accept both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload {
    Bare(Vec<QrRecord>),
    Page(RecordPage),
}

impl ListPayload {
    pub fn into_records(self) -> Vec<QrRecord> {
        match self {
            ListPayload::Bare(records) => records,
            ListPayload::Page(page) => page.results,
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}
