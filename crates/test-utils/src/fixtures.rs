//! Encoded fixtures: tile PNG bytes and catalog listings.

use bytes::Bytes;
use image::{ImageOutputFormat, RgbImage};
use std::io::Cursor;

use stitch_common::ProductId;

use crate::generators::numbered_tile;

/// Base URL used by the mock upstream.
pub const TEST_BASE_URL: &str = "http://upstream.test/data";

/// Tile edge length used by most tests. Real upstream tiles are 678px.
pub const TEST_TILE_SIZE: u32 = 16;

/// Common catalog timestamps (compact `YYYYMMDDHHMMSS`), newest first.
pub const TEST_TIMESTAMPS: [i64; 3] = [20240115123020, 20240115122020, 20240115121020];

/// The product every test targets unless it says otherwise.
pub fn test_product() -> ProductId {
    ProductId::new("goes-16", "full_disk", "geocolor")
}

/// Encode a raster as PNG bytes.
pub fn png_bytes(img: &RgbImage) -> Bytes {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png)
        .expect("PNG encoding of a fixture failed");
    Bytes::from(out.into_inner())
}

/// PNG bytes of [`numbered_tile`].
pub fn numbered_tile_png(size: u32, index: usize) -> Bytes {
    png_bytes(&numbered_tile(size, index))
}

/// A catalog listing body in the upstream's `latest_times.json` shape.
pub fn catalog_json(timestamps: &[i64]) -> Bytes {
    Bytes::from(serde_json::json!({ "timestamps_int": timestamps }).to_string())
}
