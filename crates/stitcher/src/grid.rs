//! Tile grid planning.

use stitch_common::{ProductId, StitchError, StitchResult, TileKey, Timestamp};

/// Deepest zoom whose grid can be planned. A zoom-10 grid is already over a
/// million tiles; beyond that the key list itself becomes the problem.
///
/// Builds asking for more first fetch the grid's corner tile, so a level
/// upstream does not serve fails as `TileFetchFailed`.
pub const MAX_ZOOM: u32 = 10;

/// Smallest zoom whose grid spans at least `target` pixels.
///
/// `ceil(log2(ceil(target / tile_size)))`, so a target no larger than one
/// tile (including 0) is zoom 0.
pub fn derive_zoom(target: u32, tile_size: u32) -> u32 {
    if tile_size == 0 || target <= tile_size {
        return 0;
    }
    target
        .div_ceil(tile_size)
        .next_power_of_two()
        .trailing_zeros()
}

/// Every tile key of the `2^zoom × 2^zoom` grid in row-major order:
/// index `i = y * 2^zoom + x`.
pub fn plan_grid(product: &ProductId, zoom: u32, timestamp: Timestamp) -> StitchResult<Vec<TileKey>> {
    if zoom > MAX_ZOOM {
        return Err(StitchError::invalid_parameter(
            "zoom",
            format!("{} exceeds the maximum of {}", zoom, MAX_ZOOM),
        ));
    }

    let n = 1u32 << zoom;
    let mut keys = Vec::with_capacity((n as usize) * (n as usize));
    for y in 0..n {
        for x in 0..n {
            keys.push(TileKey::new(product.clone(), zoom, x, y, timestamp));
        }
    }
    Ok(keys)
}
