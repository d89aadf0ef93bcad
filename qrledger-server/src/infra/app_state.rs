use std::{fmt, sync::Arc};

use qrledger_config::Config;
use qrledger_core::{InMemoryQrCodeRepository, QrCodeRepository, Registry};

/// Which backend the registry was wired to at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Postgres => "postgres",
            StorageKind::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub config: Arc<Config>,
    pub storage: StorageKind,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        repo: Arc<dyn QrCodeRepository>,
        config: Config,
        storage: StorageKind,
    ) -> Self {
        Self {
            registry: Registry::new(repo),
            config: Arc::new(config),
            storage,
        }
    }

    /// State backed by a fresh in-memory repository.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            Arc::new(InMemoryQrCodeRepository::new()),
            config,
            StorageKind::Memory,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
