//! HTTP request handlers.
//!
//! - `stitch`: composite image endpoint and its query parsing
//! - `metrics`: health and Prometheus endpoints
//! - `common`: error responses

pub mod common;
pub mod metrics;
pub mod stitch;

pub use common::error_response;
pub use metrics::{health_handler, metrics_handler};
pub use stitch::{stitch_handler, StitchParams};
