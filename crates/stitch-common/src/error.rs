//! Error types for the stitching pipeline.

use thiserror::Error;

use crate::tile::TileKey;

/// Result type alias using StitchError.
pub type StitchResult<T> = Result<T, StitchError>;

/// Primary error type for stitch builds.
///
/// Every variant is terminal for the build that raised it.
#[derive(Debug, Error)]
pub enum StitchError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid timestamp request: {0}")]
    InvalidTimestampRequest(String),

    #[error("Requested format not supported: {0}")]
    UnsupportedFormat(String),

    // === Upstream Errors ===
    #[error("Timestamp metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Failed to fetch tile {key}: {message}")]
    TileFetchFailed { key: TileKey, message: String },

    // === Composition Errors ===
    #[error("Malformed tile grid: {0}")]
    MalformedGrid(String),

    // === Filter Errors ===
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Filter '{filter}' expects {expected} argument(s), got {actual}")]
    FilterArityMismatch {
        filter: String,
        expected: String,
        actual: usize,
    },

    #[error("Invalid argument for filter '{filter}': {message}")]
    InvalidFilterArgument { filter: String, message: String },

    #[error("Filter '{filter}' precondition failed: {message}")]
    FilterPreconditionFailed { filter: String, message: String },

    // === Infrastructure Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Encoding failed: {0}")]
    EncodeError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl StitchError {
    /// Short machine-readable code, used in logs and error responses.
    pub fn code(&self) -> &'static str {
        match self {
            StitchError::InvalidParameter { .. } => "InvalidParameter",
            StitchError::InvalidTimestampRequest(_) => "InvalidTimestampRequest",
            StitchError::UnsupportedFormat(_) => "UnsupportedFormat",
            StitchError::MetadataUnavailable(_) => "MetadataUnavailable",
            StitchError::TileFetchFailed { .. } => "TileFetchFailed",
            StitchError::MalformedGrid(_) => "MalformedGrid",
            StitchError::UnknownFilter(_) => "UnknownFilter",
            StitchError::FilterArityMismatch { .. } => "FilterArityMismatch",
            StitchError::InvalidFilterArgument { .. } => "InvalidFilterArgument",
            StitchError::FilterPreconditionFailed { .. } => "FilterPreconditionFailed",
            StitchError::CacheError(_) => "CacheError",
            StitchError::EncodeError(_) => "EncodeError",
            StitchError::InternalError(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            StitchError::InvalidParameter { .. }
            | StitchError::InvalidTimestampRequest(_)
            | StitchError::UnsupportedFormat(_)
            | StitchError::UnknownFilter(_)
            | StitchError::FilterArityMismatch { .. }
            | StitchError::InvalidFilterArgument { .. }
            | StitchError::FilterPreconditionFailed { .. } => 400,

            StitchError::MetadataUnavailable(_) | StitchError::TileFetchFailed { .. } => 502,

            _ => 500,
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        StitchError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StitchError {
    fn from(err: std::io::Error) -> Self {
        StitchError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StitchError::UnknownFilter("blur".into()).http_status_code(), 400);
        assert_eq!(
            StitchError::MetadataUnavailable("down".into()).http_status_code(),
            502
        );
        assert_eq!(StitchError::MalformedGrid("3 tiles".into()).http_status_code(), 500);
    }

    #[test]
    fn test_arity_message() {
        let err = StitchError::FilterArityMismatch {
            filter: "add_px_top".into(),
            expected: "1".into(),
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "Filter 'add_px_top' expects 1 argument(s), got 0"
        );
        assert_eq!(err.code(), "FilterArityMismatch");
    }
}
