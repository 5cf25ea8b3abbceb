//! Tile grid compositing.

use image::imageops;

use stitch_common::{StitchError, StitchResult};

use crate::Raster;

/// Integer square root of `n` if `n` is a perfect square.
fn exact_sqrt(n: usize) -> Option<usize> {
    let mut root = (n as f64).sqrt() as usize;
    // Float sqrt can land one off for large inputs
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    (root * root == n).then_some(root)
}

/// Paste an `n×n` grid of equally sized square tiles onto one canvas.
///
/// Tile `i` sits at column `i % n`, row `i / n`, i.e. pixel offset
/// `(x·T, y·T)`. Tiles are copied, not blended.
pub fn stitch(tiles: &[Raster]) -> StitchResult<Raster> {
    let n = exact_sqrt(tiles.len())
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            StitchError::MalformedGrid(format!(
                "{} tiles do not form a square grid",
                tiles.len()
            ))
        })?;

    let (tile_size, tile_h) = tiles[0].dimensions();
    if tile_size == 0 || tile_size != tile_h {
        return Err(StitchError::MalformedGrid(format!(
            "tile 0 is {}x{}, expected a non-empty square",
            tile_size, tile_h
        )));
    }

    if let Some((i, tile)) = tiles
        .iter()
        .enumerate()
        .find(|(_, t)| t.dimensions() != (tile_size, tile_size))
    {
        let (w, h) = tile.dimensions();
        return Err(StitchError::MalformedGrid(format!(
            "tile {} is {}x{}, expected {}x{}",
            i, w, h, tile_size, tile_size
        )));
    }

    let side = u32::try_from(n)
        .ok()
        .and_then(|n| n.checked_mul(tile_size))
        .ok_or_else(|| {
            StitchError::MalformedGrid(format!(
                "{}x{} grid of {}px tiles is too large",
                n, n, tile_size
            ))
        })?;

    let mut canvas = Raster::new(side, side);
    for (i, tile) in tiles.iter().enumerate() {
        let x = (i % n) as i64 * tile_size as i64;
        let y = (i / n) as i64 * tile_size as i64;
        imageops::replace(&mut canvas, tile, x, y);
    }

    Ok(canvas)
}
