use qrledger_model::routes::API_PREFIX;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::network::{Network, NetworkRequest};
use super::storage::CacheStorage;
use super::types::{
    CacheRequest, Destination, FetchOutcome, FetchSource, OfflineError, Result,
};

/// Versioned asset cache sitting between the page and the network.
pub struct OfflineCache {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    cache_name: String,
    origin: Url,
    assets: Vec<String>,
}

impl std::fmt::Debug for OfflineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineCache")
            .field("cache_name", &self.cache_name)
            .field("origin", &self.origin.as_str())
            .field("assets", &self.assets.len())
            .finish()
    }
}

impl OfflineCache {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        cache_name: impl Into<String>,
        origin: Url,
        assets: Vec<String>,
    ) -> Self {
        Self {
            storage,
            network,
            cache_name: cache_name.into(),
            origin,
            assets,
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URL for an entry of the asset list. Absolute entries are
    /// kept as-is; paths resolve against the origin.
    pub fn asset_url(&self, asset: &str) -> Result<Url> {
        match Url::parse(asset) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) if asset.starts_with('/') => {
                let (path, query) = match asset.split_once('?') {
                    Some((path, query)) => (path, Some(query)),
                    None => (asset, None),
                };
                Ok(self.origin_url(path, query))
            }
            Err(_) => Err(OfflineError::InvalidAsset(asset.to_string())),
        }
    }

    /// URL on the origin for a request path. The host always stays the
    /// origin's, even for paths such as `//other.host/x`.
    pub fn origin_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.origin.clone();
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        url
    }

    fn is_api(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin() && url.path().starts_with(API_PREFIX)
    }

    /// Fetch every asset, then store them under the current version.
    /// Nothing is written unless all of them succeed.
    pub async fn install(&self) -> Result<usize> {
        let mut fetched = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let url = self.asset_url(asset)?;
            let response = self
                .network
                .send(NetworkRequest::get(url.clone()))
                .await
                .map_err(|e| OfflineError::Install {
                    asset: asset.clone(),
                    reason: e.to_string(),
                })?;
            if !response.is_ok() {
                return Err(OfflineError::Install {
                    asset: asset.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((url, response));
        }

        for (url, response) in &fetched {
            self.storage
                .put(&self.cache_name, url.as_str(), response)
                .await?;
        }
        info!(cache = %self.cache_name, assets = fetched.len(), "offline cache installed");
        Ok(fetched.len())
    }

    /// Delete every cache that is not the current version.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.cache_names().await? {
            if name == self.cache_name {
                continue;
            }
            if self.storage.delete_cache(&name).await? {
                info!(cache = %name, "deleted stale cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Cache first, then network; documents fall back to the cached root
    /// page when the network is unreachable.
    ///
    /// Registry API calls are network-first; their cached copy is used only
    /// when the network fails.
    pub async fn fetch(&self, request: &CacheRequest) -> Result<FetchOutcome> {
        let api = self.is_api(&request.url);
        if !api && let Some(outcome) = self.cached(request).await? {
            return Ok(outcome);
        }

        match self.network.send(NetworkRequest::get(request.url.clone())).await {
            Ok(response) => {
                if response.is_cacheable()
                    && let Err(error) = self
                        .storage
                        .put(&self.cache_name, request.key(), &response)
                        .await
                {
                    warn!(url = %request.url, %error, "could not cache response");
                }
                Ok(FetchOutcome {
                    response,
                    source: FetchSource::Network,
                })
            }
            Err(error) => {
                debug!(url = %request.url, %error, "network unavailable");
                if api && let Some(outcome) = self.cached(request).await? {
                    return Ok(outcome);
                }
                if request.destination == Destination::Document {
                    let root = self.origin_url("/", None);
                    if let Some(response) =
                        self.storage.match_any(root.as_str()).await?
                    {
                        return Ok(FetchOutcome {
                            response,
                            source: FetchSource::Fallback,
                        });
                    }
                }
                Err(OfflineError::Offline {
                    url: request.url.to_string(),
                })
            }
        }
    }

    async fn cached(&self, request: &CacheRequest) -> Result<Option<FetchOutcome>> {
        let response = self.storage.match_any(request.key()).await?;
        if response.is_some() {
            debug!(url = %request.url, "served from cache");
        }
        Ok(response.map(|response| FetchOutcome {
            response,
            source: FetchSource::Cache,
        }))
    }
}
