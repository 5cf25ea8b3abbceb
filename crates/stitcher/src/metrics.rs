//! Metric names recorded by the pipeline.

use metrics::{describe_counter, describe_histogram, Unit};

pub const BUILDS_TOTAL: &str = "stitch_builds_total";
pub const BUILD_FAILURES_TOTAL: &str = "stitch_build_failures_total";
pub const TILE_CACHE_HITS_TOTAL: &str = "stitch_tile_cache_hits_total";
pub const TILE_CACHE_MISSES_TOTAL: &str = "stitch_tile_cache_misses_total";
pub const TILES_FETCHED_TOTAL: &str = "stitch_tiles_fetched_total";
pub const BUILD_DURATION_SECONDS: &str = "stitch_build_duration_seconds";

/// Register descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(BUILDS_TOTAL, "Composite builds started");
    describe_counter!(BUILD_FAILURES_TOTAL, "Composite builds that failed");
    describe_counter!(TILE_CACHE_HITS_TOTAL, "Tiles served from the cache");
    describe_counter!(TILE_CACHE_MISSES_TOTAL, "Tile lookups that missed the cache");
    describe_counter!(TILES_FETCHED_TOTAL, "Tiles fetched from upstream");
    describe_histogram!(BUILD_DURATION_SECONDS, Unit::Seconds, "Composite build time");
}
