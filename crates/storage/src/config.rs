//! Cache configuration and backend construction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use stitch_common::StitchResult;

use crate::cache::{CacheBackend, RedisTileCache, TileCache};
use crate::embedded::RedbTileCache;
use crate::tile_memory_cache::TileMemoryCache;

/// Which cache to use and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Redis URL (redis backend)
    pub redis_url: String,
    /// Database file (redb backend)
    pub redb_path: PathBuf,
    /// Memory limit in megabytes (memory backend)
    pub memory_max_mb: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::None,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redb_path: PathBuf::from("stitch-cache.redb"),
            memory_max_mb: 512,
        }
    }
}

/// Build the configured cache, or `None` when caching is disabled.
pub async fn open_cache(config: &CacheConfig) -> StitchResult<Option<Arc<dyn TileCache>>> {
    let cache: Option<Arc<dyn TileCache>> = match config.backend {
        CacheBackend::None => None,
        CacheBackend::Memory => Some(Arc::new(TileMemoryCache::new(config.memory_max_mb))),
        CacheBackend::Redb => Some(Arc::new(RedbTileCache::open(&config.redb_path)?)),
        CacheBackend::Redis => Some(Arc::new(RedisTileCache::connect(&config.redis_url).await?)),
    };

    info!(backend = %config.backend, "Tile cache configured");

    Ok(cache)
}
