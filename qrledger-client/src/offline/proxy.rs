//! Local HTTP proxy: GET goes through [`OfflineCache::fetch`], everything
//! else is forwarded to the origin untouched.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    CacheRequest, CachedResponse, Destination, FetchSource, Network,
    NetworkRequest, OfflineCache, OfflineError,
};

/// Response header naming where a proxied GET was served from.
pub const CACHE_STATUS_HEADER: HeaderName =
    HeaderName::from_static("x-qrledger-cache");

#[derive(Clone)]
pub struct ProxyState {
    cache: Arc<OfflineCache>,
    network: Arc<dyn Network>,
}

impl std::fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyState")
            .field("cache", &self.cache)
            .finish()
    }
}

pub fn router(cache: Arc<OfflineCache>, network: Arc<dyn Network>) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .with_state(ProxyState { cache, network })
}

/// Navigations are documents: `Sec-Fetch-Dest: document`, or an `Accept`
/// header asking for HTML.
pub fn destination_of(headers: &HeaderMap) -> Destination {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    };
    if header("sec-fetch-dest").eq_ignore_ascii_case("document")
        || header(ACCEPT.as_str()).contains("text/html")
    {
        Destination::Document
    } else {
        Destination::Other
    }
}

async fn proxy_handler(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = state.cache.origin_url(uri.path(), uri.query());

    if method == Method::GET {
        let request = CacheRequest::new(url, destination_of(&headers));
        return match state.cache.fetch(&request).await {
            Ok(outcome) => into_response(outcome.response, Some(outcome.source)),
            Err(error @ OfflineError::Offline { .. }) => {
                debug!(%error, "offline miss");
                (StatusCode::SERVICE_UNAVAILABLE, error.to_string()).into_response()
            }
            Err(error) => {
                warn!(%error, "proxied fetch failed");
                (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
            }
        };
    }

    let header_text = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let request = NetworkRequest {
        method,
        url,
        accept: header_text(ACCEPT),
        content_type: header_text(CONTENT_TYPE),
        body: body.to_vec(),
    };
    match state.network.send(request).await {
        Ok(response) => into_response(response, None),
        Err(error) => {
            warn!(%error, "forwarding failed");
            (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
        }
    }
}

fn into_response(response: CachedResponse, source: Option<FetchSource>) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::new();
    if let Some(content_type) = response
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        headers.insert(CONTENT_TYPE, content_type);
    }
    if let Some(source) = source {
        let label = match source {
            FetchSource::Cache => "hit",
            FetchSource::Network => "miss",
            FetchSource::Fallback => "fallback",
        };
        headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static(label));
    }
    (status, headers, response.body).into_response()
}
