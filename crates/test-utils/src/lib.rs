//! Shared test utilities for the stitch workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Tile and catalog fixtures (encoded PNG bytes, catalog JSON)
//! - Raster generators with verifiable pixel patterns
//! - An in-memory [`MockTransport`] that serves a fake upstream
//! - A [`FailingCache`] for exercising cache outages
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{MockTransport, MockUpstream};
//! ```

pub mod failing_cache;
pub mod fixtures;
pub mod generators;
pub mod mock_transport;

// Re-export commonly used items at the crate root
pub use failing_cache::FailingCache;
pub use fixtures::*;
pub use generators::*;
pub use mock_transport::{MockTransport, MockUpstream};

/// Assert that two rasters have identical dimensions and pixels, reporting
/// the first differing pixel instead of dumping both buffers.
#[macro_export]
macro_rules! assert_raster_eq {
    ($left:expr, $right:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(
            left.dimensions(),
            right.dimensions(),
            "raster dimensions differ"
        );
        if let Some((x, y, a)) = left
            .enumerate_pixels()
            .find(|(x, y, p)| *p != right.get_pixel(*x, *y))
        {
            panic!(
                "assertion failed: rasters differ at ({}, {}): left {:?}, right {:?}",
                x,
                y,
                a,
                right.get_pixel(x, y)
            );
        }
    }};
}
