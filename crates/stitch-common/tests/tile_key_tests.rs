//! Tests for tile key addressing across whole grids.

use std::collections::HashSet;

use stitch_common::{BuildRequest, ProductId, TileKey};

fn keys_for(product: &ProductId, zoom: u32, timestamp: i64) -> Vec<TileKey> {
    let side = 1u32 << zoom;
    (0..side)
        .flat_map(|y| (0..side).map(move |x| (x, y)))
        .map(|(x, y)| TileKey::new(product.clone(), zoom, x, y, timestamp))
        .collect()
}

#[test]
fn test_cache_keys_unique_across_zooms_and_times() {
    let product = ProductId::new("goes-16", "full_disk", "geocolor");
    let mut seen_cache = HashSet::new();
    let mut seen_url = HashSet::new();
    let mut total = 0;

    for timestamp in [20240115120000, 20240115121000] {
        for zoom in 0..=3 {
            for key in keys_for(&product, zoom, timestamp) {
                seen_cache.insert(key.cache_key());
                seen_url.insert(key.url("https://example.test/data"));
                total += 1;
            }
        }
    }

    assert_eq!(seen_cache.len(), total);
    assert_eq!(seen_url.len(), total);
}

#[test]
fn test_cache_keys_unique_across_products() {
    // Identifiers that would collide under naive concatenation
    let a = ProductId::new("a-", "b", "c");
    let b = ProductId::new("a", "-b", "c");
    assert!(BuildRequest::new("a-").with_sector("b").with_product("c").validate().is_ok());
    assert!(BuildRequest::new("a").with_sector("-b").with_product("c").validate().is_ok());

    let ka = TileKey::new(a, 0, 0, 0, 1);
    let kb = TileKey::new(b, 0, 0, 0, 1);
    assert_ne!(ka.cache_key(), kb.cache_key());
}

#[test]
fn test_tile_key_display() {
    let key = TileKey::new(ProductId::new("goes-16", "conus", "band_02"), 3, 4, 5, 42);
    assert_eq!(key.to_string(), "goes-16/conus/band_02@42 z3 (4, 5)");
}
