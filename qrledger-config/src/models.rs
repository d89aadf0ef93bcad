use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub client: ClientConfig,
    pub scanner: ScannerConfig,
    pub offline: OfflineConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and the `/static` assets, if served.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Window during which a repeated payload is not handled again.
    pub cooldown: Duration,
    /// Hint passed to decoders that sample frames.
    pub max_scans_per_second: u32,
}

#[derive(Debug, Clone)]
pub struct OfflineConfig {
    pub cache_name: String,
    pub cache_root: PathBuf,
    pub assets: Vec<String>,
    pub proxy_listen: SocketAddr,
    /// Origin whose responses count as same-origin (`basic`).
    pub origin: Url,
}

impl OfflineConfig {
    pub fn ensure_cache_root(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.cache_root)?;
        Ok(())
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
