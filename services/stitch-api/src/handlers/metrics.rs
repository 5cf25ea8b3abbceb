//! Health checks and metrics.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::AppState;

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut output = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    output.push_str(&format!(
        "# HELP stitch_uptime_seconds Seconds since the server started\n# TYPE stitch_uptime_seconds gauge\nstitch_uptime_seconds {}\n",
        state.started_at.elapsed().as_secs()
    ));
    output.push_str(&format!(
        "# HELP stitch_cache_backend_info Configured tile cache backend\n# TYPE stitch_cache_backend_info gauge\nstitch_cache_backend_info{{backend=\"{}\"}} 1\n",
        state.stitcher.cache_backend()
    ));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}
