//! Test error types.

use thiserror::Error;

/// Errors raised while building requests or reading responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// The response body is not what the caller asked for.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A header name or value is invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}
