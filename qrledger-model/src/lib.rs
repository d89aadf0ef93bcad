//! Core data model definitions shared across qrledger crates.
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod ids;
pub mod prelude;
pub mod record;
pub mod routes;
pub mod stats;
pub mod verify;

// Intentionally curated re-exports for downstream consumers.
pub use api::{CreateRecordResponse, ErrorBody, ListPayload, ListQuery, RecordPage};
pub use error::{ModelError, Result as ModelResult};
pub use ids::QrRecordId;
pub use record::{MAX_NAME_LEN, MAX_NUMBER_LEN, NewQrRecord, QrRecord};
pub use stats::RegistryStats;
pub use verify::{VerifyOutcome, VerifyRequest};
