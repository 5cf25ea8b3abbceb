//! Build request and filter context types.

use serde::{Deserialize, Serialize};

use crate::error::{StitchError, StitchResult};
use crate::tile::ProductId;
use crate::time::Timestamp;

pub const DEFAULT_SATELLITE: &str = "goes-16";
pub const DEFAULT_SECTOR: &str = "full_disk";
pub const DEFAULT_PRODUCT: &str = "geocolor";
pub const DEFAULT_TIMESTAMP: &str = "latest";
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// One filter invocation: a name plus its string arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInvocation {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterInvocation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl std::fmt::Display for FilterInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.args.join("-"))
        }
    }
}

/// Parse a flat filter spec such as `trim,scale:1920-1080,timestamp`.
///
/// Items are separated by `,`; an item's arguments follow the first `:` and
/// are separated by `-`. Blank items are skipped.
pub fn parse_filter_spec(spec: &str) -> Vec<FilterInvocation> {
    spec.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once(':') {
            Some((name, args)) => FilterInvocation::new(
                name.trim(),
                args.split('-').map(|a| a.trim().to_string()).collect(),
            ),
            None => FilterInvocation::new(item, Vec::new()),
        })
        .collect()
}

/// Complete description of one composite to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub satellite: String,
    pub sector: String,
    pub product: String,
    /// `latest`, a literal catalog timestamp, or a date/time to match nearest.
    pub timestamp: String,
    /// Explicit zoom; derived from the target size when absent.
    pub zoom: Option<u32>,
    pub width: u32,
    pub height: u32,
    pub filters: Vec<FilterInvocation>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            satellite: DEFAULT_SATELLITE.to_string(),
            sector: DEFAULT_SECTOR.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            zoom: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            filters: Vec::new(),
        }
    }
}

impl BuildRequest {
    pub fn new(satellite: impl Into<String>) -> Self {
        Self {
            satellite: satellite.into(),
            ..Self::default()
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_timestamp(mut self, token: impl Into<String>) -> Self {
        self.timestamp = token.into();
        self
    }

    pub fn with_zoom(mut self, zoom: Option<u32>) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterInvocation>) -> Self {
        self.filters = filters;
        self
    }

    pub fn product_id(&self) -> ProductId {
        ProductId::new(&self.satellite, &self.sector, &self.product)
    }

    /// The larger of the two target dimensions, used to size the grid.
    pub fn target_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Check the catalog identifiers.
    ///
    /// Identifiers end up in URLs and cache keys, so they are restricted to
    /// ASCII alphanumerics plus `-`, `_` and `.`.
    pub fn validate(&self) -> StitchResult<()> {
        for (param, value) in [
            ("satellite", &self.satellite),
            ("sector", &self.sector),
            ("product", &self.product),
        ] {
            validate_identifier(param, value)?;
        }
        if self.timestamp.trim().is_empty() {
            return Err(StitchError::InvalidTimestampRequest(
                "empty timestamp".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_identifier(param: &str, value: &str) -> StitchResult<()> {
    if value.is_empty() {
        return Err(StitchError::invalid_parameter(param, "must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(StitchError::invalid_parameter(param, "must not be a path component"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(StitchError::invalid_parameter(
            param,
            format!("unexpected character {:?}", c),
        ));
    }
    Ok(())
}

/// Per-build values that filters may read.
///
/// Carries the resolved timestamp so the request itself never has to be
/// modified after the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    pub satellite: String,
    pub sector: String,
    pub product: String,
    pub timestamp: Timestamp,
    pub target_width: u32,
    pub target_height: u32,
}

impl FilterContext {
    pub fn for_request(request: &BuildRequest, timestamp: Timestamp) -> Self {
        Self {
            satellite: request.satellite.clone(),
            sector: request.sector.clone(),
            product: request.product.clone(),
            timestamp,
            target_width: request.width,
            target_height: request.height,
        }
    }
}
