//! Image operations for the stitcher.
//!
//! - Tile decode and output encoding (PNG, JPEG, WebP)
//! - Grid compositing
//! - Named post-processing filters
//! - Text overlay with an embedded font

pub mod codec;
pub mod composite;
pub mod filters;
pub mod png;
pub mod text;

/// 8-bit RGB image used throughout the pipeline.
pub type Raster = image::RgbImage;

pub use codec::{decode, encode, EncodeOptions, OutputFormat};
pub use composite::stitch;
pub use filters::{Filter, FilterChain, FilterRegistry};
