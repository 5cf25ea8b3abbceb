//! In-memory LRU cache for raw tile and metadata bytes.
//!
//! ## Memory-Based Eviction
//!
//! The cache uses memory-based eviction rather than entry count. When the
//! cache exceeds its configured memory limit, it evicts ~5% of entries
//! (by memory) in a batch to make room for new entries.
//!
//! Entries written with a TTL expire lazily on read; entries written without
//! one stay until evicted.

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use stitch_common::StitchResult;

use crate::cache::{CacheBackend, TileCache};

/// Effectively unbounded entry capacity; eviction is driven by memory use.
const LRU_CAPACITY: usize = 10_000_000;

/// In-memory LRU cache for tile bytes.
pub struct TileMemoryCache {
    cache: Arc<Mutex<LruCache<String, CachedEntry>>>,
    max_bytes: u64,
    stats: Arc<TileMemoryCacheStats>,
}

struct CachedEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Statistics for the tile memory cache.
///
/// All fields are atomic for lock-free reads.
#[derive(Default)]
pub struct TileMemoryCacheStats {
    /// Total cache hits
    pub hits: AtomicU64,
    /// Total cache misses
    pub misses: AtomicU64,
    /// Total entries evicted (individual count)
    pub evictions: AtomicU64,
    /// Total entries expired via TTL
    pub expired: AtomicU64,
    /// Current cache size in bytes
    pub size_bytes: AtomicU64,
    /// Current number of entries in cache
    pub entry_count: AtomicU64,
    /// Number of batch eviction runs
    pub eviction_runs: AtomicU64,
}

impl TileMemoryCacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl TileMemoryCache {
    /// Create new cache with specified memory limit.
    ///
    /// # Arguments
    /// * `max_size_mb` - Maximum cache size in megabytes
    ///
    /// # Example
    /// ```
    /// use storage::TileMemoryCache;
    ///
    /// // 512MB of tiles
    /// let cache = TileMemoryCache::new(512);
    /// assert_eq!(cache.max_bytes(), 512 * 1024 * 1024);
    /// ```
    pub fn new(max_size_mb: usize) -> Self {
        let capacity = NonZeroUsize::new(LRU_CAPACITY).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            max_bytes: (max_size_mb as u64) * 1024 * 1024,
            stats: Arc::new(TileMemoryCacheStats::default()),
        }
    }

    async fn lookup(&self, key: &str) -> Option<Bytes> {
        let mut cache = self.cache.lock().await;

        match cache.get(key) {
            Some(entry) if entry.is_expired() => {
                let size = entry.data.len() as u64;
                cache.pop(key);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                self.stats.size_bytes.fetch_sub(size, Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                None
            }
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.data.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn store(&self, key: &str, data: Bytes, ttl: Option<Duration>) {
        let size = data.len() as u64;

        let mut cache = self.cache.lock().await;

        // The old value is replaced either way, so drop it from the accounting first
        if let Some(existing) = cache.pop(key) {
            self.stats
                .size_bytes
                .fetch_sub(existing.data.len() as u64, Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }

        if size > self.max_bytes {
            debug!(key = %key, size, max_bytes = self.max_bytes, "Entry larger than the cache, not stored");
            return;
        }

        // Evict inside the lock so size accounting cannot race
        while self.stats.size_bytes.load(Ordering::Relaxed) + size > self.max_bytes {
            let (evicted, _) = self.evict_batch_locked(&mut cache);
            if evicted == 0 {
                break;
            }
        }

        self.stats.entry_count.fetch_add(1, Ordering::Relaxed);

        cache.put(
            key.to_string(),
            CachedEntry {
                data,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );

        self.stats.size_bytes.fetch_add(size, Ordering::Relaxed);
    }

    /// Evict ~5% of cache capacity (by memory) using LRU order.
    ///
    /// Returns (entries_evicted, bytes_freed).
    fn evict_batch_locked(&self, cache: &mut LruCache<String, CachedEntry>) -> (usize, u64) {
        let current_bytes = self.stats.size_bytes.load(Ordering::Relaxed);

        let target_free = (self.max_bytes / 20).max(1);
        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0usize;

        while bytes_freed < target_free {
            match cache.pop_lru() {
                Some((_, evicted)) => {
                    bytes_freed += evicted.data.len() as u64;
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        self.stats
            .size_bytes
            .fetch_sub(bytes_freed, Ordering::Relaxed);
        self.stats
            .entry_count
            .fetch_sub(entries_evicted as u64, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(entries_evicted as u64, Ordering::Relaxed);
        self.stats.eviction_runs.fetch_add(1, Ordering::Relaxed);

        info!(
            entries_evicted = entries_evicted,
            bytes_freed_mb = format!("{:.2}", bytes_freed as f64 / (1024.0 * 1024.0)),
            cache_size_mb =
                format!("{:.2}", (current_bytes - bytes_freed) as f64 / (1024.0 * 1024.0)),
            max_size_mb = format!("{:.2}", self.max_bytes as f64 / (1024.0 * 1024.0)),
            "Memory cache batch eviction completed"
        );

        (entries_evicted, bytes_freed)
    }

    /// Shared statistics handle.
    pub fn stats(&self) -> Arc<TileMemoryCacheStats> {
        self.stats.clone()
    }

    /// Current number of entries in cache.
    pub fn len(&self) -> usize {
        self.stats.entry_count.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get maximum cache size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Get current cache size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.stats.size_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TileCache for TileMemoryCache {
    async fn get(&self, key: &str) -> StitchResult<Option<Bytes>> {
        Ok(self.lookup(key).await)
    }

    async fn put(&self, key: &str, data: Bytes, ttl: Option<Duration>) -> StitchResult<()> {
        self.store(key, data, ttl).await;
        Ok(())
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Memory
    }
}
