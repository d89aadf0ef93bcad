//! Offline cache interceptor: versioned asset cache plus a local proxy that
//! serves GET requests through it.

mod cache;
mod disk;
mod network;
pub mod proxy;
mod storage;
mod types;

pub use cache::OfflineCache;
pub use disk::DiskCacheStorage;
pub use network::{HttpNetwork, Network, NetworkRequest};
pub use storage::{CacheStorage, MemoryCacheStorage};
pub use types::{
    CacheRequest, CachedResponse, Destination, FetchOutcome, FetchSource,
    OfflineError, ResponseKind, Result,
};
