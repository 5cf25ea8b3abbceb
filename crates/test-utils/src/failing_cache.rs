//! A cache backend whose every operation errors.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stitch_common::{StitchError, StitchResult};
use storage::{CacheBackend, TileCache};

/// Stands in for an unreachable cache server.
#[derive(Debug, Default)]
pub struct FailingCache {
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookups attempted so far.
    pub fn get_attempts(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Writes attempted so far.
    pub fn put_attempts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileCache for FailingCache {
    async fn get(&self, key: &str) -> StitchResult<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(StitchError::CacheError(format!("lookup of {} refused", key)))
    }

    async fn put(&self, key: &str, _data: Bytes, _ttl: Option<Duration>) -> StitchResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(StitchError::CacheError(format!("write of {} refused", key)))
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Redis
    }
}
