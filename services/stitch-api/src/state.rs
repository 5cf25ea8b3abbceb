//! Shared application state.

use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;

use renderer::EncodeOptions;
use stitcher::Stitcher;

/// State shared by every request handler.
pub struct AppState {
    pub stitcher: Stitcher,
    pub encode: EncodeOptions,
    /// Present when a Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(stitcher: Stitcher) -> Self {
        Self {
            stitcher,
            encode: EncodeOptions::default(),
            prometheus: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn with_encode_options(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }
}
