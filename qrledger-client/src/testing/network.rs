use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::offline::{
    CachedResponse, Network, NetworkRequest, OfflineError, ResponseKind,
};

/// Canned upstream responses keyed by absolute URL.
#[derive(Debug, Default)]
pub struct StubNetwork {
    responses: Mutex<HashMap<String, CachedResponse>>,
    requests: Mutex<Vec<NetworkRequest>>,
    offline: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StubNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(
        &self,
        url: &str,
        status: u16,
        kind: ResponseKind,
        body: &str,
    ) -> &Self {
        lock(&self.responses).insert(
            url.to_string(),
            CachedResponse {
                status,
                kind,
                content_type: Some("text/plain".to_string()),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    /// While offline every request fails before producing a response.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<NetworkRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn send(
        &self,
        request: NetworkRequest,
    ) -> Result<CachedResponse, OfflineError> {
        lock(&self.requests).push(request.clone());
        let url = request.url.to_string();
        if self.offline.load(Ordering::SeqCst) {
            return Err(OfflineError::Network {
                url,
                reason: "network is offline".into(),
            });
        }
        Ok(lock(&self.responses).get(&url).cloned().unwrap_or(
            CachedResponse {
                status: 404,
                kind: ResponseKind::Basic,
                content_type: None,
                body: Vec::new(),
            },
        ))
    }
}
