//! Raster generators with predictable, verifiable pixel patterns.

use image::{Rgb, RgbImage};

/// A uniformly coloured raster.
pub fn solid_raster(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Distinct, easily recognised colour for grid position `index`.
///
/// Channels are spread far apart so lossless round trips can be checked
/// by exact comparison.
///
/// # Example
///
/// ```
/// use test_utils::tile_color;
///
/// assert_ne!(tile_color(0), tile_color(1));
/// assert_eq!(tile_color(5), tile_color(5));
/// ```
pub fn tile_color(index: usize) -> [u8; 3] {
    [
        (37 + index * 53 % 200) as u8,
        (200 - index * 31 % 180) as u8,
        (index * 97 % 256) as u8,
    ]
}

/// A square tile filled with [`tile_color`] for its grid index.
pub fn numbered_tile(size: u32, index: usize) -> RgbImage {
    solid_raster(size, size, tile_color(index))
}

/// Horizontal + vertical gradient, every pixel derived from its position.
///
/// Pixel `(x, y)` is `[x % 256, y % 256, (x + y) % 256]`.
pub fn gradient_raster(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// A black raster with a coloured rectangle of content at
/// `(x, y, w, h)`, for trimming tests.
pub fn framed_raster(width: u32, height: u32, content: (u32, u32, u32, u32)) -> RgbImage {
    let (cx, cy, cw, ch) = content;
    RgbImage::from_fn(width, height, |x, y| {
        if x >= cx && x < cx + cw && y >= cy && y < cy + ch {
            Rgb([250, 200, 150])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_colors_are_distinct_for_small_grids() {
        let colors: std::collections::HashSet<_> = (0..64).map(tile_color).collect();
        assert_eq!(colors.len(), 64);
    }

    #[test]
    fn test_gradient_raster() {
        let img = gradient_raster(300, 10);
        assert_eq!(img.get_pixel(5, 7).0, [5, 7, 12]);
        assert_eq!(img.get_pixel(257, 0).0, [1, 0, 1]);
    }

    #[test]
    fn test_framed_raster() {
        let img = framed_raster(10, 10, (2, 3, 4, 5));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(2, 3).0, [250, 200, 150]);
        assert_eq!(img.get_pixel(5, 7).0, [250, 200, 150]);
        assert_eq!(img.get_pixel(6, 8).0, [0, 0, 0]);
    }
}
