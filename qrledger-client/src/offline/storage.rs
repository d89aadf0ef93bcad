use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::types::{CachedResponse, Result};

/// Named caches mapping request URLs to stored responses.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Store a response, creating the cache on first write.
    async fn put(
        &self,
        cache: &str,
        key: &str,
        response: &CachedResponse,
    ) -> Result<()>;

    async fn get(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>>;

    async fn cache_names(&self) -> Result<Vec<String>>;

    /// Returns `false` when no cache by that name existed.
    async fn delete_cache(&self, cache: &str) -> Result<bool>;

    /// First match for `key` across every cache.
    async fn match_any(&self, key: &str) -> Result<Option<CachedResponse>> {
        for name in self.cache_names().await? {
            if let Some(response) = self.get(&name, key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<BTreeMap<String, BTreeMap<String, CachedResponse>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self, cache: &str) -> usize {
        self.caches
            .read()
            .await
            .get(cache)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn put(
        &self,
        cache: &str,
        key: &str,
        response: &CachedResponse,
    ) -> Result<()> {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    async fn get(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self
            .caches
            .read()
            .await
            .get(cache)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn cache_names(&self) -> Result<Vec<String>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool> {
        Ok(self.caches.write().await.remove(cache).is_some())
    }
}
