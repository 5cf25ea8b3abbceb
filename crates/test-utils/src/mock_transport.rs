//! In-memory transport serving canned responses.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use stitch_common::{ProductId, TileKey, Timestamp, Transport, TransportError};

use crate::fixtures::{catalog_json, numbered_tile_png, TEST_BASE_URL, TEST_TILE_SIZE};

/// Transport backed by a URL → response map.
///
/// Unknown URLs fail with a permanent 404. Every call is recorded.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Result<Bytes, TransportError>>>,
    requests: Mutex<Vec<String>>,
    fetches: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every fetch, to make overlap observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `body` for `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.lock_responses().insert(url.into(), Ok(body.into()));
    }

    /// Fail requests for `url` with `error`.
    pub fn fail(&self, url: impl Into<String>, error: TransportError) {
        self.lock_responses().insert(url.into(), Err(error));
    }

    /// Total number of fetch calls.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of fetch calls for one URL.
    pub fn count_for(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }

    /// Every requested URL, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<Bytes, TransportError>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.lock_responses()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Permanent {
                    url: url.to_string(),
                    status: Some(404),
                    message: "not found".to_string(),
                })
            })
    }
}

/// Builder that fills a [`MockTransport`] with one product's catalog and
/// tiles, laid out the way the real upstream serves them.
///
/// Tile `(x, y)` at every zoom is a solid [`crate::tile_color`] of its grid
/// index `y * 2^zoom + x`.
pub struct MockUpstream {
    base_url: String,
    product: ProductId,
    timestamps: Vec<Timestamp>,
    tile_size: u32,
    max_zoom: u32,
}

impl MockUpstream {
    pub fn new(product: ProductId) -> Self {
        Self {
            base_url: TEST_BASE_URL.to_string(),
            product,
            timestamps: Vec::new(),
            tile_size: TEST_TILE_SIZE,
            max_zoom: 1,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timestamps(mut self, timestamps: &[Timestamp]) -> Self {
        self.timestamps = timestamps.to_vec();
        self
    }

    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Serve tiles for zoom levels `0..=max_zoom`.
    pub fn max_zoom(mut self, max_zoom: u32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Populate `transport` and return it.
    pub fn install(self, transport: MockTransport) -> MockTransport {
        transport.insert(
            self.product.metadata_url(&self.base_url),
            catalog_json(&self.timestamps),
        );

        for &ts in &self.timestamps {
            for zoom in 0..=self.max_zoom {
                let n = 1u32 << zoom;
                for y in 0..n {
                    for x in 0..n {
                        let key = TileKey::new(self.product.clone(), zoom, x, y, ts);
                        let index = (y * n + x) as usize;
                        transport.insert(key.url(&self.base_url), numbered_tile_png(self.tile_size, index));
                    }
                }
            }
        }

        transport
    }

    pub fn build(self) -> MockTransport {
        self.install(MockTransport::new())
    }
}
