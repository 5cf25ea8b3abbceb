//! Byte transport abstraction used by the metadata client and tile fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Failure fetching a URL.
///
/// Transports report whether a failure is worth retrying; the stitch core
/// treats both kinds as fatal for the build.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("transient failure fetching {url}: {message}")]
    Transient { url: String, message: String },

    #[error("permanent failure fetching {url}: {message}")]
    Permanent {
        url: String,
        status: Option<u16>,
        message: String,
    },
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Transient { url, .. } | TransportError::Permanent { url, .. } => url,
        }
    }
}

/// Fetch the body at a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError>;
}
