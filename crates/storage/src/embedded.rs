//! Local embedded tile store backed by a single redb file.
//!
//! redb has no notion of expiry, so this backend **ignores TTLs**: an entry
//! written with a TTL is kept until the file is deleted. That is harmless for
//! tiles, which never change for a given timestamp. Catalog listings written
//! here go stale, so prefer the memory or Redis backend for long-running
//! servers.

use async_trait::async_trait;
use bytes::Bytes;
use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use stitch_common::{StitchError, StitchResult};

use crate::cache::{CacheBackend, TileCache};

/// Raw bytes keyed by cache key.
const TILES: TableDefinition<&str, &[u8]> = TableDefinition::new("tiles");

fn cache_error(context: &str, err: impl std::fmt::Display) -> StitchError {
    StitchError::CacheError(format!("{}: {}", context, err))
}

/// redb-backed tile cache.
pub struct RedbTileCache {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbTileCache {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> StitchResult<Self> {
        let path = path.as_ref().to_path_buf();

        let db = Database::create(&path).map_err(|e| cache_error("redb open failed", e))?;

        // Create the table up front so readers never see a missing table
        let txn = db
            .begin_write()
            .map_err(|e| cache_error("redb transaction failed", e))?;
        txn.open_table(TILES)
            .map_err(|e| cache_error("redb table open failed", e))?;
        txn.commit()
            .map_err(|e| cache_error("redb commit failed", e))?;

        info!(path = %path.display(), "Opened embedded tile cache");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TileCache for RedbTileCache {
    async fn get(&self, key: &str) -> StitchResult<Option<Bytes>> {
        let db = self.db.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let txn = db
                .begin_read()
                .map_err(|e| cache_error("redb transaction failed", e))?;
            let table = txn
                .open_table(TILES)
                .map_err(|e| cache_error("redb table open failed", e))?;
            let value = table
                .get(key.as_str())
                .map_err(|e| cache_error("redb get failed", e))?;
            Ok(value.map(|guard| Bytes::copy_from_slice(guard.value())))
        })
        .await
        .map_err(|e| cache_error("redb task failed", e))?
    }

    /// Stores `data`; `ttl` is ignored.
    async fn put(&self, key: &str, data: Bytes, ttl: Option<Duration>) -> StitchResult<()> {
        if let Some(ttl) = ttl {
            debug!(key = %key, ttl_secs = ttl.as_secs(), "Embedded cache ignores TTL");
        }

        let db = self.db.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let txn = db
                .begin_write()
                .map_err(|e| cache_error("redb transaction failed", e))?;
            {
                let mut table = txn
                    .open_table(TILES)
                    .map_err(|e| cache_error("redb table open failed", e))?;
                table
                    .insert(key.as_str(), &data[..])
                    .map_err(|e| cache_error("redb insert failed", e))?;
            }
            txn.commit()
                .map_err(|e| cache_error("redb commit failed", e))
        })
        .await
        .map_err(|e| cache_error("redb task failed", e))?
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Redb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RedbTileCache::open(dir.path().join("tiles.redb")).unwrap();

        assert!(cache.get("missing").await.unwrap().is_none());

        let data = Bytes::from_static(&[0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
        cache.put("tile", data.clone(), None).await.unwrap();
        assert_eq!(cache.get("tile").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_ttl_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RedbTileCache::open(dir.path().join("tiles.redb")).unwrap();

        cache
            .put("meta", Bytes::from("catalog"), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Still present well after the requested expiry
        assert_eq!(
            cache.get("meta").await.unwrap(),
            Some(Bytes::from("catalog"))
        );
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.redb");

        {
            let cache = RedbTileCache::open(&path).unwrap();
            cache.put("tile", Bytes::from("bytes"), None).await.unwrap();
        }

        let cache = RedbTileCache::open(&path).unwrap();
        assert_eq!(cache.path(), path.as_path());
        assert_eq!(cache.get("tile").await.unwrap(), Some(Bytes::from("bytes")));
    }
}
