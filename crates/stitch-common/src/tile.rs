//! Tile addressing for the upstream imagery grid.

use serde::{Deserialize, Serialize};

use crate::time::{date_component, Timestamp};

/// Catalog identity of one imagery product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId {
    pub satellite: String,
    pub sector: String,
    pub product: String,
}

impl ProductId {
    pub fn new(
        satellite: impl Into<String>,
        sector: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            satellite: satellite.into(),
            sector: sector.into(),
            product: product.into(),
        }
    }

    /// URL of the catalog listing for this product.
    pub fn metadata_url(&self, base_url: &str) -> String {
        format!(
            "{}/json/{}/{}/{}/latest_times.json",
            base_url.trim_end_matches('/'),
            self.satellite,
            self.sector,
            self.product
        )
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.satellite, self.sector, self.product)
    }
}

/// One tile of one snapshot at one zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub product: ProductId,
    pub zoom: u32,
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    pub timestamp: Timestamp,
}

impl TileKey {
    pub fn new(product: ProductId, zoom: u32, x: u32, y: u32, timestamp: Timestamp) -> Self {
        Self {
            product,
            zoom,
            x,
            y,
            timestamp,
        }
    }

    /// Upstream URL for this tile. Upstream files are named `row_column`.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/imagery/{}/{}---{}/{}/{}/{:02}/{:03}_{:03}.png",
            base_url.trim_end_matches('/'),
            date_component(self.timestamp),
            self.product.satellite,
            self.product.sector,
            self.product.product,
            self.timestamp,
            self.zoom,
            self.y,
            self.x
        )
    }

    /// Cache key for this tile's raw bytes.
    ///
    /// Identifiers never contain `:` (see `BuildRequest::validate`), so the
    /// key is injective over all fields.
    pub fn cache_key(&self) -> String {
        format!(
            "stitch:tile:{}:{}:{}:{}:{}:{}:{}",
            self.product.satellite,
            self.product.sector,
            self.product.product,
            self.timestamp,
            self.zoom,
            self.x,
            self.y
        )
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} z{} ({}, {})",
            self.product,
            self.timestamp,
            self.zoom,
            self.x,
            self.y
        )
    }
}
