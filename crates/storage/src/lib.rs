//! Cache backends for fetched tile and catalog bytes.
//!
//! Provides one [`TileCache`] interface with interchangeable backends:
//! - In-process LRU ([`TileMemoryCache`])
//! - Local embedded store ([`RedbTileCache`], ignores TTLs)
//! - Redis for caches shared between processes ([`RedisTileCache`])

pub mod cache;
pub mod config;
pub mod embedded;
pub mod tile_memory_cache;

pub use cache::{CacheBackend, RedisTileCache, TileCache};
pub use config::{open_cache, CacheConfig};
pub use embedded::RedbTileCache;
pub use tile_memory_cache::{TileMemoryCache, TileMemoryCacheStats};
