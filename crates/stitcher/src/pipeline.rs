//! Build orchestration: catalog → timestamp → grid → tiles → image.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use renderer::{stitch, FilterRegistry, Raster};
use stitch_common::{
    BuildRequest, FilterContext, ProductId, StitchError, StitchResult, TileKey, Timestamp,
    Transport,
};
use storage::{CacheBackend, TileCache};

use crate::config::UpstreamConfig;
use crate::fetch::{fetch_grid, fetch_tile};
use crate::grid::{derive_zoom, plan_grid, MAX_ZOOM};
use crate::metadata::{fetch_timestamps, TimestampCatalog};
use crate::metrics::{BUILDS_TOTAL, BUILD_DURATION_SECONDS, BUILD_FAILURES_TOTAL};
use crate::resolver::resolve_timestamp;

/// Result of one build plus what was decided along the way.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub image: Raster,
    pub timestamp: Timestamp,
    pub zoom: u32,
    pub tile_size: u32,
    /// Tiles composited (fetched or served from cache)
    pub tiles: usize,
}

/// Shared, immutable build engine.
///
/// Cheap to share behind an `Arc`; every build borrows the same transport,
/// cache and filter registry.
pub struct Stitcher {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn TileCache>>,
    filters: Arc<FilterRegistry>,
    config: UpstreamConfig,
}

impl Stitcher {
    /// Uncached stitcher with the built-in filters.
    pub fn new(transport: Arc<dyn Transport>, config: UpstreamConfig) -> Self {
        Self {
            transport,
            cache: None,
            filters: Arc::new(FilterRegistry::builtin()),
            config,
        }
    }

    pub fn with_cache(mut self, cache: Option<Arc<dyn TileCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn cache_backend(&self) -> CacheBackend {
        self.cache
            .as_ref()
            .map_or(CacheBackend::None, |cache| cache.backend())
    }

    fn cache(&self) -> Option<&dyn TileCache> {
        self.cache.as_deref()
    }

    /// Catalog for one product, through the cache.
    pub async fn timestamps(&self, product: &ProductId) -> StitchResult<TimestampCatalog> {
        fetch_timestamps(product, self.transport.as_ref(), self.cache(), &self.config).await
    }

    /// Build the image for `request`.
    pub async fn build_image(&self, request: &BuildRequest) -> StitchResult<Raster> {
        self.build(request).await.map(|outcome| outcome.image)
    }

    /// Build the image for `request`, reporting the resolved timestamp and
    /// grid geometry alongside it.
    #[instrument(skip(self, request), fields(
        satellite = %request.satellite,
        sector = %request.sector,
        product = %request.product,
        timestamp = %request.timestamp
    ))]
    pub async fn build(&self, request: &BuildRequest) -> StitchResult<BuildOutcome> {
        counter!(BUILDS_TOTAL).increment(1);
        let started = Instant::now();

        let result = self.run(request).await;

        let elapsed = started.elapsed();
        histogram!(BUILD_DURATION_SECONDS).record(elapsed.as_secs_f64());

        match &result {
            Ok(outcome) => info!(
                resolved = outcome.timestamp,
                zoom = outcome.zoom,
                tiles = outcome.tiles,
                width = outcome.image.width(),
                height = outcome.image.height(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Build completed"
            ),
            Err(e) => {
                counter!(BUILD_FAILURES_TOTAL).increment(1);
                warn!(code = e.code(), error = %e, "Build failed");
            }
        }

        result
    }

    async fn run(&self, request: &BuildRequest) -> StitchResult<BuildOutcome> {
        request.validate()?;
        let chain = self
            .filters
            .plan_for_target(&request.filters, (request.width, request.height))?;

        let product = request.product_id();
        let catalog = self.timestamps(&product).await?;
        let timestamp = resolve_timestamp(&request.timestamp, &catalog)?;
        debug!(resolved = timestamp, "Resolved timestamp");

        let probe_key = TileKey::new(product.clone(), 0, 0, 0, timestamp);
        let probe = fetch_tile(
            &probe_key,
            self.transport.as_ref(),
            self.cache(),
            &self.config.base_url,
        )
        .await?;

        let (tile_size, probe_h) = probe.dimensions();
        if tile_size == 0 || tile_size != probe_h {
            return Err(StitchError::MalformedGrid(format!(
                "zoom 0 tile is {}x{}, expected a non-empty square",
                tile_size, probe_h
            )));
        }

        let zoom = request
            .zoom
            .unwrap_or_else(|| derive_zoom(request.target_dimension(), tile_size));
        debug!(zoom, tile_size, "Planned grid");

        let tiles = if zoom == 0 {
            vec![probe]
        } else {
            if zoom > MAX_ZOOM {
                // Too deep to plan; upstream not serving the level is the usual answer
                let corner = TileKey::new(product.clone(), zoom, 0, 0, timestamp);
                fetch_tile(
                    &corner,
                    self.transport.as_ref(),
                    self.cache(),
                    &self.config.base_url,
                )
                .await?;
            }
            let keys = plan_grid(&product, zoom, timestamp)?;
            fetch_grid(
                &keys,
                self.transport.as_ref(),
                self.cache(),
                &self.config.base_url,
            )
            .await?
        };
        let tile_count = tiles.len();

        let ctx = FilterContext::for_request(request, timestamp);
        let image = tokio::task::spawn_blocking(move || {
            let canvas = stitch(&tiles)?;
            chain.apply_all(canvas, &ctx)
        })
        .await
        .map_err(|e| StitchError::InternalError(format!("compose task failed: {}", e)))??;

        Ok(BuildOutcome {
            image,
            timestamp,
            zoom,
            tile_size,
            tiles: tile_count,
        })
    }
}
