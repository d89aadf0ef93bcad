use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// What the request is for; only documents get the root-page fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub url: Url,
    pub destination: Destination,
}

impl CacheRequest {
    pub fn new(url: Url, destination: Destination) -> Self {
        Self { url, destination }
    }

    /// The cache key for this request.
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

/// Response type as a browser fetch would classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// 2xx.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin responses are worth keeping.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
    /// The cached root document, served because the network failed.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: CachedResponse,
    pub source: FetchSource,
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("cache storage failed: {0}")]
    Storage(String),

    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("could not pre-cache {asset}: {reason}")]
    Install { asset: String, reason: String },

    #[error("invalid asset URL '{0}'")]
    InvalidAsset(String),

    #[error("{url} is unavailable offline")]
    Offline { url: String },
}

pub type Result<T> = std::result::Result<T, OfflineError>;
