//! Catalog of available timestamps for a product.

use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use stitch_common::{ProductId, StitchError, StitchResult, Timestamp, Transport};
use storage::TileCache;

use crate::config::UpstreamConfig;

/// Timestamps published for one product, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampCatalog {
    timestamps: Vec<Timestamp>,
}

impl TimestampCatalog {
    /// Wrap a listing. An empty listing has no latest entry and is rejected.
    pub fn new(timestamps: Vec<Timestamp>) -> StitchResult<Self> {
        if timestamps.is_empty() {
            return Err(StitchError::MetadataUnavailable(
                "catalog lists no timestamps".to_string(),
            ));
        }
        Ok(Self { timestamps })
    }

    pub fn latest(&self) -> Timestamp {
        self.timestamps[0]
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.timestamps.contains(&ts)
    }

    pub fn as_slice(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[derive(Deserialize)]
struct LatestTimes {
    timestamps_int: Vec<Timestamp>,
}

/// Decode a `latest_times.json` body.
pub fn parse_catalog(body: &[u8]) -> StitchResult<TimestampCatalog> {
    let listing: LatestTimes = serde_json::from_slice(body)
        .map_err(|e| StitchError::MetadataUnavailable(format!("malformed catalog: {}", e)))?;
    TimestampCatalog::new(listing.timestamps_int)
}

/// Load the catalog for `product`, preferring a cached listing.
///
/// Only listings that decode are cached; a cached body that does not decode
/// is ignored and refetched.
#[instrument(skip(transport, cache, config), fields(product = %product))]
pub async fn fetch_timestamps(
    product: &ProductId,
    transport: &dyn Transport,
    cache: Option<&dyn TileCache>,
    config: &UpstreamConfig,
) -> StitchResult<TimestampCatalog> {
    let url = product.metadata_url(&config.base_url);

    if let Some(cache) = cache {
        match cache.get(&url).await {
            Ok(Some(body)) => match parse_catalog(&body) {
                Ok(catalog) => {
                    debug!(entries = catalog.len(), "Catalog cache hit");
                    return Ok(catalog);
                }
                Err(e) => warn!(error = %e, "Discarding undecodable cached catalog"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Catalog cache lookup failed"),
        }
    }

    let body: Bytes = transport
        .fetch(&url)
        .await
        .map_err(|e| StitchError::MetadataUnavailable(e.to_string()))?;

    let catalog = parse_catalog(&body)?;
    debug!(entries = catalog.len(), latest = catalog.latest(), "Fetched catalog");

    if let Some(cache) = cache {
        if let Err(e) = cache.put(&url, body, Some(config.metadata_ttl)).await {
            warn!(error = %e, "Failed to cache catalog");
        }
    }

    Ok(catalog)
}
