//! Composite image endpoint.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

use renderer::{codec, OutputFormat};
use stitch_common::request::{
    DEFAULT_HEIGHT, DEFAULT_PRODUCT, DEFAULT_SECTOR, DEFAULT_TIMESTAMP, DEFAULT_WIDTH,
};
use stitch_common::{parse_filter_spec, BuildRequest, StitchError, StitchResult};

use super::common::error_response;
use crate::state::AppState;

pub const TIMESTAMP_HEADER: HeaderName = HeaderName::from_static("x-stitch-timestamp");
pub const ZOOM_HEADER: HeaderName = HeaderName::from_static("x-stitch-zoom");

/// Query parameters, kept as strings so malformed numbers can be reported
/// against the parameter that carried them.
#[derive(Debug, Default, Deserialize)]
pub struct StitchParams {
    pub sector: Option<String>,
    pub product: Option<String>,
    pub timestamp: Option<String>,
    pub zoom: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub filters: Option<String>,
}

fn parse_number(param: &str, value: &str) -> StitchResult<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        StitchError::invalid_parameter(param, format!("'{}' is not a non-negative integer", value))
    })
}

/// Blank values count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl StitchParams {
    /// Build request for `satellite`, applying the defaults.
    pub fn into_request(self, satellite: &str) -> StitchResult<BuildRequest> {
        let zoom = present(&self.zoom)
            .map(|v| parse_number("zoom", v))
            .transpose()?;
        let width = present(&self.width)
            .map(|v| parse_number("width", v))
            .transpose()?
            .unwrap_or(DEFAULT_WIDTH);
        let height = present(&self.height)
            .map(|v| parse_number("height", v))
            .transpose()?
            .unwrap_or(DEFAULT_HEIGHT);

        Ok(BuildRequest::new(satellite)
            .with_sector(present(&self.sector).unwrap_or(DEFAULT_SECTOR))
            .with_product(present(&self.product).unwrap_or(DEFAULT_PRODUCT))
            .with_timestamp(present(&self.timestamp).unwrap_or(DEFAULT_TIMESTAMP))
            .with_zoom(zoom)
            .with_size(width, height)
            .with_filters(parse_filter_spec(self.filters.as_deref().unwrap_or(""))))
    }
}

/// Split `goes-16.png` into the satellite and output format.
pub fn split_image_name(image: &str) -> StitchResult<(&str, OutputFormat)> {
    let (satellite, ext) = image.rsplit_once('.').ok_or_else(|| {
        StitchError::UnsupportedFormat(format!("'{}' has no image extension", image))
    })?;
    Ok((satellite, OutputFormat::from_str(ext)?))
}

/// GET /{satellite}.{ext}
#[instrument(skip(state, params))]
pub async fn stitch_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(image): Path<String>,
    Query(params): Query<StitchParams>,
) -> Response {
    let response = match render(&state, &image, params).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    };
    counter!("stitch_http_requests_total", "status" => response.status().as_u16().to_string())
        .increment(1);
    response
}

async fn render(state: &AppState, image: &str, params: StitchParams) -> StitchResult<Response> {
    let (satellite, format) = split_image_name(image)?;
    let request = params.into_request(satellite)?;
    info!(request = ?request, format = %format, "Stitch request");

    let outcome = state.stitcher.build(&request).await?;

    let options = state.encode;
    let image = outcome.image;
    let body = tokio::task::spawn_blocking(move || codec::encode(&image, format, &options))
        .await
        .map_err(|e| StitchError::InternalError(format!("encode task failed: {}", e)))??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (TIMESTAMP_HEADER, outcome.timestamp.to_string()),
            (ZOOM_HEADER, outcome.zoom.to_string()),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_image_name() {
        assert_eq!(split_image_name("goes-16.png").unwrap(), ("goes-16", OutputFormat::Png));
        assert_eq!(split_image_name("goes-16.jpg").unwrap(), ("goes-16", OutputFormat::Jpeg));
        assert_eq!(split_image_name("himawari.v2.webp").unwrap(), ("himawari.v2", OutputFormat::Webp));
        assert!(matches!(
            split_image_name("goes-16.gif"),
            Err(StitchError::UnsupportedFormat(_))
        ));
        assert!(split_image_name("goes-16").is_err());
    }

    #[test]
    fn test_defaults() {
        let req = StitchParams::default().into_request("goes-17").unwrap();
        assert_eq!(req, BuildRequest::new("goes-17"));
    }

    #[test]
    fn test_explicit_values() {
        let params = StitchParams {
            sector: Some("conus".into()),
            zoom: Some("3".into()),
            width: Some("800".into()),
            height: Some(" 600 ".into()),
            filters: Some("trim,scale".into()),
            ..StitchParams::default()
        };
        let req = params.into_request("goes-18").unwrap();
        assert_eq!(req.sector, "conus");
        assert_eq!(req.zoom, Some(3));
        assert_eq!((req.width, req.height), (800, 600));
        assert_eq!(req.filters.len(), 2);
    }

    #[test]
    fn test_malformed_numbers() {
        for (zoom, width) in [(Some("x"), None), (None, Some("-5")), (None, Some("1e3"))] {
            let params = StitchParams {
                zoom: zoom.map(String::from),
                width: width.map(String::from),
                ..StitchParams::default()
            };
            let err = params.into_request("goes-16").unwrap_err();
            assert!(matches!(err, StitchError::InvalidParameter { .. }));
            assert_eq!(err.http_status_code(), 400);
        }
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let params = StitchParams {
            zoom: Some("".into()),
            timestamp: Some(" ".into()),
            ..StitchParams::default()
        };
        let req = params.into_request("goes-16").unwrap();
        assert_eq!(req.zoom, None);
        assert_eq!(req.timestamp, "latest");
    }
}
