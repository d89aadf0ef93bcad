//! # qrledger server
//!
//! HTTP registry for QR codes. Exposes the `/api/qrcodes/` REST surface
//! (create, list, retrieve, delete, verify, stats), a health probe, and
//! optionally the static web shell the browser client is served from.
//!
//! Records live in PostgreSQL when a database URL is configured, otherwise
//! in a process-local in-memory store.

pub mod app;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::{AppState, StorageKind};
pub use infra::errors::{AppError, AppResult};
