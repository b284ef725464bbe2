//! HTTP client for polling the Accrual engine, with bounded retry and
//! `Retry-After` back-off.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::AccrualClientError;
use crate::money::Unit;

/// Status of an order as reported by the Accrual engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualStatus {
    Registered,
    Invalid,
    Processing,
    Processed,
    /// Any status string the client doesn't recognize.
    Unknown,
}

impl From<&str> for AccrualStatus {
    fn from(s: &str) -> Self {
        match s {
            "REGISTERED" => AccrualStatus::Registered,
            "INVALID" => AccrualStatus::Invalid,
            "PROCESSING" => AccrualStatus::Processing,
            "PROCESSED" => AccrualStatus::Processed,
            _ => AccrualStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccrualInfo {
    pub order: String,
    pub status: AccrualStatus,
    pub accrual: Unit,
}

#[derive(Debug, Deserialize)]
struct WireAccrualInfo {
    order: String,
    status: String,
    #[serde(default)]
    accrual: Unit,
}

/// The contract the Mart Order Processor depends on, so a fake can stand in
/// for tests.
#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn get_accrual_info(
        &self,
        token: &CancellationToken,
        order: &str,
    ) -> Result<AccrualInfo, AccrualClientError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub retry: u32,
    pub backoff: Duration,
    pub secure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: Duration::from_secs(10),
            retry: 3,
            backoff: Duration::from_secs(1),
            secure: false,
        }
    }
}

/// Reqwest-based implementation of [`AccrualClient`].
pub struct HttpAccrualClient {
    client: reqwest::Client,
    base_addr: String,
    opts: ClientOptions,
}

impl HttpAccrualClient {
    pub fn new(base_addr: impl Into<String>, opts: ClientOptions) -> Self {
        let client = reqwest::Client::builder()
            .timeout(opts.timeout)
            .build()
            .expect("building the accrual http client");
        HttpAccrualClient { client, base_addr: base_addr.into(), opts }
    }

    fn url(&self, order: &str) -> String {
        let scheme = if self.opts.secure { "https" } else { "http" };
        let base = self.base_addr.trim_start_matches("http://").trim_start_matches("https://");
        format!("{scheme}://{base}/api/orders/{order}")
    }

    async fn send_with_retry(
        &self,
        token: &CancellationToken,
        url: &str,
    ) -> Result<reqwest::Response, AccrualClientError> {
        let mut attempts_left = self.opts.retry.max(1);

        loop {
            match self.client.get(url).send().await {
                Ok(res) => return Ok(res),
                Err(err) if err.is_timeout() || err.is_connect() || err.is_request() => {
                    attempts_left -= 1;
                    if attempts_left == 0 {
                        return Err(AccrualClientError::Other(err.into()));
                    }
                    tokio::select! {
                        _ = token.cancelled() => return Err(AccrualClientError::Canceled),
                        _ = tokio::time::sleep(self.opts.backoff) => {}
                    }
                }
                Err(err) => return Err(AccrualClientError::Other(err.into())),
            }
        }
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn get_accrual_info(
        &self,
        token: &CancellationToken,
        order: &str,
    ) -> Result<AccrualInfo, AccrualClientError> {
        let url = self.url(order);
        let res = self.send_with_retry(token, &url).await?;

        match res.status() {
            reqwest::StatusCode::OK => {
                let wire: WireAccrualInfo =
                    res.json().await.map_err(|e| AccrualClientError::Other(e.into()))?;
                Ok(AccrualInfo {
                    order: wire.order,
                    status: AccrualStatus::from(wire.status.as_str()),
                    accrual: wire.accrual,
                })
            }
            reqwest::StatusCode::NO_CONTENT => Err(AccrualClientError::OrderNotRegistered),
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = res
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                let message = res
                    .text()
                    .await
                    .unwrap_or_default()
                    .to_lowercase();
                Err(AccrualClientError::ResourceExhausted {
                    retry_after: Duration::from_secs(retry_after),
                    message,
                })
            }
            _ => Err(AccrualClientError::InternalServerError),
        }
    }
}
