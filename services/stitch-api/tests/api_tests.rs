//! Router tests against an in-memory upstream.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use renderer::codec::decode;
use stitch_api::{build_router, state::AppState};
use stitcher::{Stitcher, UpstreamConfig};
use test_utils::{
    assert_raster_eq, numbered_tile, test_product, MockUpstream, TEST_BASE_URL, TEST_TILE_SIZE,
    TEST_TIMESTAMPS,
};

fn app() -> Router {
    let transport = MockUpstream::new(test_product())
        .timestamps(&TEST_TIMESTAMPS)
        .max_zoom(1)
        .build();
    let stitcher = Stitcher::new(
        Arc::new(transport),
        UpstreamConfig::default().with_base_url(TEST_BASE_URL),
    );
    build_router(Arc::new(AppState::new(stitcher)))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_health() {
    let response = get(app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = get(app(), "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("stitch_uptime_seconds"));
    assert!(text.contains("backend=\"none\""));
}

#[tokio::test]
async fn test_png_zoom_zero() {
    let response = get(app(), "/goes-16.png?zoom=0").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(
        response.headers()["x-stitch-timestamp"],
        TEST_TIMESTAMPS[0].to_string().as_str()
    );
    assert_eq!(response.headers()["x-stitch-zoom"], "0");

    let image = decode(&body_bytes(response).await).unwrap();
    assert_raster_eq!(image, numbered_tile(TEST_TILE_SIZE, 0));
}

#[tokio::test]
async fn test_jpeg_with_filters() {
    let uri = format!(
        "/goes-16.jpg?sector=full_disk&product=geocolor&timestamp={}&zoom=1&filters=scale:20-10",
        TEST_TIMESTAMPS[1]
    );
    let response = get(app(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(
        response.headers()["x-stitch-timestamp"],
        TEST_TIMESTAMPS[1].to_string().as_str()
    );

    let image = decode(&body_bytes(response).await).unwrap();
    assert_eq!(image.dimensions(), (20, 10));
}

#[tokio::test]
async fn test_webp() {
    let response = get(app(), "/goes-16.webp?zoom=0").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/webp");
}

#[tokio::test]
async fn test_unsupported_extension() {
    let response = get(app(), "/goes-16.gif").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "UnsupportedFormat");
}

#[tokio::test]
async fn test_malformed_numeric_query() {
    let response = get(app(), "/goes-16.png?width=wide").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "InvalidParameter");
}

#[tokio::test]
async fn test_filter_errors_are_bad_requests() {
    for uri in [
        "/goes-16.png?filters=sharpen",
        "/goes-16.png?filters=scale:1",
        "/goes-16.png?zoom=0&filters=scale:4000-4000",
    ] {
        let response = get(app(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_satellite_is_bad_gateway() {
    let response = get(app(), "/goes-99.png").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "MetadataUnavailable");
}

#[tokio::test]
async fn test_missing_zoom_level_is_bad_gateway() {
    // upstream only serves zooms 0 and 1
    let response = get(app(), "/goes-16.png?zoom=2").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
