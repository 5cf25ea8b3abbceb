//! Tile cache abstraction and the Redis-backed implementation.

use async_trait::async_trait;
use bytes::Bytes;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use stitch_common::{StitchError, StitchResult};

/// Byte cache shared by every build in the process.
///
/// Implementations must be safe for concurrent use by unrelated builds.
/// `ttl` is a hint from the writer; backends that cannot expire entries
/// say so in their documentation.
#[async_trait]
pub trait TileCache: Send + Sync {
    /// Get cached bytes, `None` if absent or expired.
    async fn get(&self, key: &str) -> StitchResult<Option<Bytes>>;

    /// Store bytes, optionally expiring after `ttl`.
    async fn put(&self, key: &str, data: Bytes, ttl: Option<Duration>) -> StitchResult<()>;

    /// Which backend this is.
    fn backend(&self) -> CacheBackend;
}

/// Available cache backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    None,
    Memory,
    Redb,
    Redis,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::None => "none",
            CacheBackend::Memory => "memory",
            CacheBackend::Redb => "redb",
            CacheBackend::Redis => "redis",
        }
    }
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" | "" => Ok(CacheBackend::None),
            "memory" | "lru" => Ok(CacheBackend::Memory),
            "redb" | "embedded" | "local" => Ok(CacheBackend::Redb),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!(
                "unknown cache backend '{}' (expected none, memory, redb or redis)",
                other
            )),
        }
    }
}

/// Redis tile cache client.
///
/// Honours TTLs with `SET EX`; writes without a TTL never expire.
pub struct RedisTileCache {
    conn: MultiplexedConnection,
}

impl RedisTileCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> StitchResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| StitchError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StitchError::CacheError(format!("Redis connection failed: {}", e)))?;

        info!(url = %redis_url, "Connected to Redis tile cache");

        Ok(Self { conn })
    }
}

#[async_trait]
impl TileCache for RedisTileCache {
    async fn get(&self, key: &str) -> StitchResult<Option<Bytes>> {
        let mut conn = self.conn.clone();

        let result: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| StitchError::CacheError(format!("Cache get failed: {}", e)))?;

        Ok(result.map(Bytes::from))
    }

    async fn put(&self, key: &str, data: Bytes, ttl: Option<Duration>) -> StitchResult<()> {
        let mut conn = self.conn.clone();

        match ttl {
            // Redis rejects an expiry of zero seconds
            Some(ttl) => {
                let _: () = conn
                    .set_ex(key, &data[..], ttl.as_secs().max(1))
                    .await
                    .map_err(|e| StitchError::CacheError(format!("Cache set failed: {}", e)))?;
            }
            None => {
                let _: () = conn
                    .set(key, &data[..])
                    .await
                    .map_err(|e| StitchError::CacheError(format!("Cache set failed: {}", e)))?;
            }
        }

        Ok(())
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Redis
    }
}
