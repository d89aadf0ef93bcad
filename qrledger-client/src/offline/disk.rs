use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::types::{CachedResponse, OfflineError, ResponseKind, Result};

/// One `cacache` directory per named cache under a common root.
///
/// Directory names are the URL-safe base64 of the cache name so that any
/// version string maps to a valid path and can be recovered from it.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

/// On-disk form of a [`CachedResponse`].
#[derive(Serialize, Deserialize)]
struct Envelope {
    status: u16,
    kind: ResponseKind,
    #[serde(default)]
    content_type: Option<String>,
    body: String,
}

impl From<&CachedResponse> for Envelope {
    fn from(response: &CachedResponse) -> Self {
        Self {
            status: response.status,
            kind: response.kind,
            content_type: response.content_type.clone(),
            body: STANDARD.encode(&response.body),
        }
    }
}

impl TryFrom<Envelope> for CachedResponse {
    type Error = OfflineError;

    fn try_from(envelope: Envelope) -> Result<Self> {
        let body = STANDARD.decode(envelope.body).map_err(|e| {
            OfflineError::Storage(format!("cached body is not base64: {e}"))
        })?;
        Ok(Self {
            status: envelope.status,
            kind: envelope.kind,
            content_type: envelope.content_type,
            body,
        })
    }
}

impl DiskCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, cache: &str) -> PathBuf {
        self.root.join(URL_SAFE_NO_PAD.encode(cache))
    }
}

fn decode_dir_name(name: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(name).ok()?;
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn put(
        &self,
        cache: &str,
        key: &str,
        response: &CachedResponse,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(&Envelope::from(response)).map_err(|e| {
            OfflineError::Storage(format!("encode cache entry failed: {e}"))
        })?;
        cacache::write(self.cache_dir(cache), key, bytes)
            .await
            .map_err(|e| {
                OfflineError::Storage(format!("cacache write failed: {e}"))
            })?;
        debug!(cache, key, "cached response");
        Ok(())
    }

    async fn get(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>> {
        let dir = self.cache_dir(cache);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(None);
        }

        let bytes = match cacache::read(&dir, key).await {
            Ok(bytes) => bytes,
            Err(cacache::Error::EntryNotFound(_, _)) => return Ok(None),
            Err(cacache::Error::IntegrityError(err)) => {
                warn!(cache, key, %err, "dropping corrupt cache entry");
                return Ok(None);
            }
            Err(cacache::Error::SizeMismatch(wanted, actual)) => {
                warn!(cache, key, wanted, actual, "dropping truncated cache entry");
                return Ok(None);
            }
            Err(cacache::Error::IoError(_, msg)) => {
                return Err(OfflineError::Storage(format!(
                    "cacache read I/O error: {msg}"
                )));
            }
            Err(cacache::Error::SerdeError(_, msg)) => {
                return Err(OfflineError::Storage(format!(
                    "cacache read serde error: {msg}"
                )));
            }
        };

        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| {
            OfflineError::Storage(format!("decode cache entry failed: {e}"))
        })?;
        CachedResponse::try_from(envelope).map(Some)
    }

    async fn cache_names(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(OfflineError::Storage(format!(
                    "list caches in {} failed: {err}",
                    self.root.display()
                )));
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            OfflineError::Storage(format!("list caches failed: {e}"))
        })? {
            let is_dir = entry
                .file_type()
                .await
                .map(|kind| kind.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            match entry.file_name().to_str().and_then(decode_dir_name) {
                Some(name) => names.push(name),
                None => debug!(path = ?entry.path(), "skipping foreign directory"),
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool> {
        match tokio::fs::remove_dir_all(self.cache_dir(cache)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(OfflineError::Storage(format!(
                "delete cache '{cache}' failed: {err}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &[u8]) -> CachedResponse {
        CachedResponse {
            status: 200,
            kind: ResponseKind::Basic,
            content_type: Some("text/css".into()),
            body: body.to_vec(),
        }
    }

    #[tokio::test]
    async fn entries_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = "http://localhost:8000/static/css/style.css";

        DiskCacheStorage::new(dir.path())
            .put("qr-manager-v1", key, &response(b"body{}"))
            .await
            .unwrap();

        let reopened = DiskCacheStorage::new(dir.path());
        assert_eq!(
            reopened.get("qr-manager-v1", key).await.unwrap(),
            Some(response(b"body{}"))
        );
        assert_eq!(reopened.get("qr-manager-v1", "missing").await.unwrap(), None);
        assert_eq!(reopened.get("other", key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cache_names_round_trip_through_directory_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        storage.put("qr-manager-v1", "/", &response(b"a")).await.unwrap();
        storage.put("old cache/v0", "/", &response(b"b")).await.unwrap();

        assert_eq!(
            storage.cache_names().await.unwrap(),
            vec!["old cache/v0".to_string(), "qr-manager-v1".to_string()]
        );

        assert!(storage.delete_cache("old cache/v0").await.unwrap());
        assert!(!storage.delete_cache("old cache/v0").await.unwrap());
        assert_eq!(
            storage.cache_names().await.unwrap(),
            vec!["qr-manager-v1".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_root_has_no_caches() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskCacheStorage::new(dir.path().join("absent"));
        assert!(storage.cache_names().await.unwrap().is_empty());
        assert_eq!(storage.match_any("/").await.unwrap(), None);
    }
}
