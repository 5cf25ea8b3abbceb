//! Tests for grid compositing.

use image::Rgb;
use renderer::{stitch, Raster};
use stitch_common::StitchError;
use test_utils::{numbered_tile, tile_color};

#[test]
fn test_four_tiles_land_at_documented_offsets() {
    let tiles: Vec<Raster> = (0..4).map(|i| numbered_tile(100, i)).collect();
    let canvas = stitch(&tiles).unwrap();

    assert_eq!(canvas.dimensions(), (200, 200));

    // tile i = y * 2 + x at (x * 100, y * 100)
    let corners = [(0, 0), (100, 0), (0, 100), (100, 100)];
    for (i, (x, y)) in corners.into_iter().enumerate() {
        let expected = Rgb(tile_color(i));
        assert_eq!(canvas.get_pixel(x, y), &expected, "tile {} origin", i);
        assert_eq!(canvas.get_pixel(x + 99, y + 99), &expected, "tile {} far corner", i);
    }
}

#[test]
fn test_sixteen_tiles_row_major() {
    let tiles: Vec<Raster> = (0..16).map(|i| numbered_tile(8, i)).collect();
    let canvas = stitch(&tiles).unwrap();

    assert_eq!(canvas.dimensions(), (32, 32));
    for y in 0..4u32 {
        for x in 0..4u32 {
            let i = (y * 4 + x) as usize;
            assert_eq!(canvas.get_pixel(x * 8 + 3, y * 8 + 5), &Rgb(tile_color(i)));
        }
    }
}

#[test]
fn test_tile_content_is_copied_not_blended() {
    let mut tile = Raster::new(4, 4);
    tile.put_pixel(1, 2, Rgb([255, 255, 255]));
    let tiles = vec![tile.clone(), Raster::new(4, 4), Raster::new(4, 4), tile];

    let canvas = stitch(&tiles).unwrap();
    assert_eq!(canvas.get_pixel(1, 2), &Rgb([255, 255, 255]));
    assert_eq!(canvas.get_pixel(5, 6), &Rgb([255, 255, 255]));
    assert_eq!(canvas.get_pixel(5, 2), &Rgb([0, 0, 0]));
}

#[test]
fn test_malformed_grids() {
    let two = vec![Raster::new(4, 4); 2];
    assert!(matches!(stitch(&two), Err(StitchError::MalformedGrid(_))));

    let mut uneven = vec![Raster::new(4, 4); 9];
    uneven[8] = Raster::new(8, 8);
    assert!(matches!(stitch(&uneven), Err(StitchError::MalformedGrid(_))));
}
