use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ReceiptRequest;

use super::{HealthStatus, PdfGateway, TransportError};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const GENERATE_PATH: &str = "/api/gerar-pdf";
const HEALTH_PATH: &str = "/api/health";

/// Connection settings for the PDF service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the PDF service.
pub struct PdfClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl PdfClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, url: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            TransportError::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Turn a non-2xx reply into an error, using the `error` field of a JSON
/// body when there is one.
async fn service_error(response: reqwest::Response) -> TransportError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("HTTP error: {}", status));
    TransportError::Service { status, message }
}

impl PdfGateway for PdfClient {
    async fn render_receipt(&self, request: &ReceiptRequest) -> Result<Vec<u8>, TransportError> {
        let url = self.url(GENERATE_PATH);
        debug!(%url, rows = request.atendimentos.len(), "requesting receipt");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;

        if !response.status().is_success() {
            let err = service_error(response).await;
            warn!(error = %err, "receipt request rejected");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        debug!(size = bytes.len(), "receipt received");
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let url = self.url(HEALTH_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        // The body is informative only; an empty or non-JSON body still
        // means the service is up.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}
