//! Tile fetching through the cache.

use bytes::Bytes;
use futures::future::try_join_all;
use metrics::counter;
use tracing::{debug, warn};

use renderer::{codec, Raster};
use stitch_common::{StitchError, StitchResult, TileKey, Transport};
use storage::TileCache;

use crate::metrics::{TILES_FETCHED_TOTAL, TILE_CACHE_HITS_TOTAL, TILE_CACHE_MISSES_TOTAL};

/// Decode on the blocking pool.
async fn decode_tile(key: &TileKey, bytes: Bytes) -> StitchResult<Raster> {
    tokio::task::spawn_blocking(move || codec::decode(&bytes))
        .await
        .map_err(|e| StitchError::InternalError(format!("decode task failed: {}", e)))?
        .map_err(|e| StitchError::TileFetchFailed {
            key: key.clone(),
            message: format!("undecodable tile: {}", e),
        })
}

/// Load one tile, from the cache when possible.
///
/// Fetched bytes are cached (without expiry) only after they decode.
pub async fn fetch_tile(
    key: &TileKey,
    transport: &dyn Transport,
    cache: Option<&dyn TileCache>,
    base_url: &str,
) -> StitchResult<Raster> {
    let cache_key = key.cache_key();

    if let Some(cache) = cache {
        match cache.get(&cache_key).await {
            Ok(Some(bytes)) => match decode_tile(key, bytes).await {
                Ok(raster) => {
                    counter!(TILE_CACHE_HITS_TOTAL).increment(1);
                    return Ok(raster);
                }
                Err(e) => warn!(tile = %key, error = %e, "Discarding undecodable cached tile"),
            },
            Ok(None) => {}
            Err(e) => warn!(tile = %key, error = %e, "Tile cache lookup failed"),
        }
        counter!(TILE_CACHE_MISSES_TOTAL).increment(1);
    }

    let bytes = transport
        .fetch(&key.url(base_url))
        .await
        .map_err(|e| StitchError::TileFetchFailed {
            key: key.clone(),
            message: e.to_string(),
        })?;
    counter!(TILES_FETCHED_TOTAL).increment(1);

    let raster = decode_tile(key, bytes.clone()).await?;
    debug!(tile = %key, width = raster.width(), height = raster.height(), "Fetched tile");

    if let Some(cache) = cache {
        if let Err(e) = cache.put(&cache_key, bytes, None).await {
            warn!(tile = %key, error = %e, "Failed to cache tile");
        }
    }

    Ok(raster)
}

/// Load every tile concurrently, returning rasters in `keys` order.
///
/// The first failure aborts the whole grid; outstanding fetches are dropped.
pub async fn fetch_grid(
    keys: &[TileKey],
    transport: &dyn Transport,
    cache: Option<&dyn TileCache>,
    base_url: &str,
) -> StitchResult<Vec<Raster>> {
    try_join_all(
        keys.iter()
            .map(|key| fetch_tile(key, transport, cache, base_url)),
    )
    .await
}
