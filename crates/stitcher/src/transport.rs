//! HTTP transport for the upstream imagery server.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use stitch_common::{StitchError, StitchResult, Transport, TransportError};

use crate::config::UpstreamConfig;

/// `reqwest` client with a process-wide cap on in-flight requests.
///
/// The cap is shared by every build using this transport, so many
/// concurrent builds cannot multiply the load on the upstream.
pub struct HttpTransport {
    client: Client,
    permits: Arc<Semaphore>,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> StitchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(config.max_concurrent_fetches.max(1))
            .tcp_nodelay(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StitchError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
        })
    }

    /// Requests currently allowed to start.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

fn classify_status(url: &str, status: StatusCode) -> TransportError {
    let message = format!("upstream returned {}", status);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        TransportError::Transient {
            url: url.to_string(),
            message,
        }
    } else {
        TransportError::Permanent {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message,
        }
    }
}

fn classify_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Permanent {
            url: url.to_string(),
            status: None,
            message: err.to_string(),
        }
    } else {
        TransportError::Transient {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| TransportError::Transient {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(url, status));
        }

        let body = response.bytes().await.map_err(|e| classify_error(url, e))?;
        debug!(url = %url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}
