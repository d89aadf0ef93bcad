//! Registry client: typed access to the `/api/qrcodes/` surface.

pub mod client;
pub mod error;
pub mod service;

pub use client::ApiClient;
pub use error::ClientError;
pub use service::RegistryService;
#[cfg(test)]
pub use service::MockRegistryService;
