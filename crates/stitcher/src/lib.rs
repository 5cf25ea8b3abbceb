//! Satellite tile stitching pipeline.
//!
//! Resolves a requested time against the upstream catalog, fetches the
//! tile grid for that snapshot through an optional cache, composites the
//! tiles and runs the requested filters.
//!
//! Network access goes through [`stitch_common::Transport`]; the
//! production implementation is [`HttpTransport`].

pub mod config;
pub mod fetch;
pub mod grid;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod transport;

pub use config::UpstreamConfig;
pub use grid::{derive_zoom, plan_grid, MAX_ZOOM};
pub use metadata::{fetch_timestamps, TimestampCatalog};
pub use pipeline::{BuildOutcome, Stitcher};
pub use resolver::resolve_timestamp;
pub use transport::HttpTransport;
