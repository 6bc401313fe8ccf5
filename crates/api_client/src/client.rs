//! HTTP client for the satellite API server.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, FeedConnector, OrderSource, ServerConfig};
use reqwest::{header, Client, Identity, StatusCode};
use tracing::{debug, instrument};

use crate::error::{classify_feed_error, ApiClientError};
use crate::sse::{order_events, OrderStream};

const FEED_PATH: &str = "/subscribe/transmissions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// API client for order retrieval, confirmation and the event feed
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Client for bounded request/response calls
    http: Client,
    /// Client for the long-lived feed (no total timeout)
    feed_http: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new API client from the server configuration.
    ///
    /// When both `tls_cert` and `tls_key` are set, every request presents
    /// them as a client identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be read or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiClientError> {
        let identity = match (&config.tls_cert, &config.tls_key) {
            (Some(cert), Some(key)) => Some(load_identity(cert, key)?),
            _ => None,
        };

        let mut http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_s));
        let mut feed_http = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(identity) = identity {
            http = http.identity(identity.clone());
            feed_http = feed_http.identity(identity);
        }

        Ok(Self {
            http: http.build()?,
            feed_http: feed_http.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn load_identity(cert: &Path, key: &Path) -> Result<Identity, ApiClientError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|source| ApiClientError::Credential {
            path: path.display().to_string(),
            source,
        })
    };
    let mut pem = read(cert)?;
    pem.push(b'\n');
    pem.extend(read(key)?);
    Ok(Identity::from_pem(&pem)?)
}

impl OrderSource for ApiClient {
    #[instrument(name = "api_fetch_data", skip(self))]
    async fn fetch_data(&self, seq_num: u32) -> Result<Option<Bytes>, ContractError> {
        let url = self.url(&format!("/message/{seq_num}"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ContractError::order_fetch(seq_num, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(seq_num, "no message stored for sequence number");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContractError::order_fetch(
                seq_num,
                format!("API error ({status}): {body}"),
            ));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| ContractError::order_fetch(seq_num, e.to_string()))?;
        Ok((!data.is_empty()).then_some(data))
    }

    #[instrument(name = "api_confirm_tx", skip(self))]
    async fn confirm_tx(&self, seq_num: u32, regions: &[u8]) -> Result<(), ContractError> {
        let url = self.url(&format!("/order/tx/{seq_num}"));
        let regions = serde_json::to_string(regions)
            .map_err(|e| ContractError::order_confirm(seq_num, e.to_string()))?;

        let response = self
            .http
            .post(&url)
            .form(&[("regions", regions)])
            .send()
            .await
            .map_err(|e| ContractError::order_confirm(seq_num, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(seq_num, "transmission confirmed");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ContractError::order_confirm(
                seq_num,
                format!("API error ({status}): {body}"),
            ))
        }
    }
}

impl FeedConnector for ApiClient {
    type Events = OrderStream;

    #[instrument(name = "api_feed_connect", skip(self), fields(url = %self.base_url))]
    async fn connect(&self) -> Result<OrderStream, ContractError> {
        let response = self
            .feed_http
            .get(self.url(FEED_PATH))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(classify_feed_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::FeedRequest {
                message: format!("feed subscription rejected ({status})"),
            });
        }

        Ok(order_events(response.bytes_stream(), classify_feed_error))
    }
}
