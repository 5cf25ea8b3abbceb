//! HTTP front end for the tile stitcher.
//!
//! Routes:
//! - `GET /{satellite}.{png|jpg|jpeg|webp}` - build and return a composite
//! - `GET /health` - liveness
//! - `GET /metrics` - Prometheus text exposition

pub mod handlers;
pub mod state;

use axum::{extract::Extension, routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the service router around shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/:image", get(handlers::stitch_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
