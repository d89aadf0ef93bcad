//! Shared configuration library for qrledger.
//!
//! This crate centralizes config loading (`.env`, TOML file, environment
//! overrides, defaults) and validation. Both the registry server and the
//! client binary load their settings through [`ConfigLoader`] so there is a
//! single source of truth for defaults and guard rails.

pub mod constants;
pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    ClientConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    OfflineConfig, ScannerConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
