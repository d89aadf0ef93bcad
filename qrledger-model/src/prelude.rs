//! Convenient glob import for consumers of the model crate.

pub use crate::api::{
    CreateRecordResponse, ErrorBody, ListPayload, ListQuery, RecordPage,
};
pub use crate::error::ModelError;
pub use crate::ids::QrRecordId;
pub use crate::record::{NewQrRecord, QrRecord};
pub use crate::routes;
pub use crate::stats::RegistryStats;
pub use crate::verify::{VerifyOutcome, VerifyRequest};
