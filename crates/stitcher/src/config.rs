//! Upstream access configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://rammb-slider.cira.colostate.edu/data";

/// Where the imagery lives and how hard to lean on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Root of the `json/` and `imagery/` trees, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout: Duration,
    /// Upper bound on in-flight upstream requests across all builds.
    pub max_concurrent_fetches: usize,
    /// How long a catalog listing stays valid in the cache.
    pub metadata_ttl: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("rammb-stitch/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 8,
            metadata_ttl: Duration::from_secs(60),
        }
    }
}

impl UpstreamConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}
