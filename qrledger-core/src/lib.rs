//! Registry rules for qrledger.
//!
//! [`Registry`] owns the behaviour behind every REST operation: input
//! normalization, the duplicate check, the two-step verify lookup and the
//! creation statistics. Storage sits behind the [`QrCodeRepository`] port so
//! the server can run against PostgreSQL or an in-memory store.

#![allow(missing_docs)]

/// Extraction of a record number from scanned payloads
pub mod content;

/// Storage ports and backends
pub mod database;

/// Error types for registry operations
pub mod error;

/// Registry service used by the HTTP handlers
pub mod registry;

/// Day/week/month windows for creation statistics
pub mod stats;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use content::extract_number_from_content;
pub use database::{InMemoryQrCodeRepository, QrCodeRepository};
#[cfg(feature = "database")]
pub use database::PostgresQrCodeRepository;
pub use error::{RegistryError, Result};
pub use registry::Registry;
pub use stats::StatsWindow;
