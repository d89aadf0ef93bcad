use async_trait::async_trait;
use axum::http::Method;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use url::Url;

use super::types::{CachedResponse, OfflineError, ResponseKind, Result};

/// A request sent upstream, either on a cache miss or passed through the
/// proxy unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    pub method: Method,
    pub url: Url,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl NetworkRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            accept: None,
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Upstream fetch. Errors mean the request never produced a response;
/// non-2xx statuses are returned as responses.
#[async_trait]
pub trait Network: Send + Sync {
    async fn send(&self, request: NetworkRequest) -> Result<CachedResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: Url,
}

impl HttpNetwork {
    pub fn new(origin: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            OfflineError::Network {
                url: origin.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { client, origin })
    }

    /// `basic` for the configured origin, `cors` for anything else.
    pub fn classify(&self, url: &Url) -> ResponseKind {
        if url.origin() == self.origin.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn send(&self, request: NetworkRequest) -> Result<CachedResponse> {
        let kind = self.classify(&request.url);
        let url = request.url.to_string();
        let network_error = |e: reqwest::Error| OfflineError::Network {
            url: url.clone(),
            reason: e.to_string(),
        };

        let mut builder = self.client.request(request.method, request.url);
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(network_error)?.to_vec();

        Ok(CachedResponse {
            status,
            kind,
            content_type,
            body,
        })
    }
}
