use async_trait::async_trait;
use qrledger_model::{
    CreateRecordResponse, ErrorBody, ListPayload, NewQrRecord, QrRecord,
    QrRecordId, RegistryStats, VerifyOutcome, VerifyRequest,
    routes::qrcodes,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{error::ClientError, service::RegistryService};

/// HTTP client for the registry.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = Client::builder().timeout(timeout).build()?;

        info!(%base_url, "registry client ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a registry path such as `/api/qrcodes/`.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let path = path.as_ref();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::Decode(err.to_string()))
    }
}

/// Accept `host:port`, add a scheme when missing, drop trailing slashes.
fn normalize_base_url(raw: String) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidBaseUrl(raw));
    }
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            let normalized = format!("http://{trimmed}");
            warn!(from = %raw, to = %normalized, "normalized registry URL");
            normalized
        };

    url::Url::parse(&with_scheme)
        .map_err(|_| ClientError::InvalidBaseUrl(raw.clone()))?;
    Ok(with_scheme)
}

/// Turn non-2xx responses into typed errors carrying the server's `error`.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .ok()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    debug!(status = status.as_u16(), %message, "registry rejected request");
    Err(ClientError::from_status(status.as_u16(), message))
}

#[async_trait]
impl RegistryService for ApiClient {
    async fn create(
        &self,
        record: NewQrRecord,
    ) -> Result<QrRecord, ClientError> {
        let request = self
            .client
            .post(self.build_url(qrcodes::COLLECTION))
            .json(&record);
        let created: CreateRecordResponse = self.execute(request).await?;
        Ok(created.qr_code)
    }

    async fn list(&self) -> Result<Vec<QrRecord>, ClientError> {
        let request = self.client.get(self.build_url(qrcodes::COLLECTION));
        let payload: ListPayload = self.execute(request).await?;
        Ok(payload.into_records())
    }

    async fn delete(&self, id: QrRecordId) -> Result<(), ClientError> {
        let request = self.client.delete(self.build_url(qrcodes::item(id)));
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn verify(
        &self,
        content: &str,
    ) -> Result<VerifyOutcome, ClientError> {
        let request = self
            .client
            .post(self.build_url(qrcodes::VERIFY))
            .json(&VerifyRequest::new(content));
        self.execute(request).await
    }

    async fn stats(&self) -> Result<RegistryStats, ClientError> {
        let request = self.client.get(self.build_url(qrcodes::STATS));
        self.execute(request).await
    }
}
