//! Error types for Folio.
//!
//! This module provides the [`ReportsError`] type, the standard error type used
//! by the export pipeline. Every variant maps to an [`ErrorCategory`], which in
//! turn decides the HTTP status code the resource layer responds with.

use crate::export::ExportType;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ReportsError`].
pub type ReportsResult<T> = Result<T, ReportsError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request or the report description is invalid.
    Validation,
    /// The requested route or resource does not exist.
    NotFound,
    /// The data repository failed.
    External,
    /// Rendering or writing the document failed.
    Internal,
    /// The request did not complete in time.
    Timeout,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::External => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// Standard error type for the export pipeline.
///
/// # Example
///
/// ```
/// use folio_core::{ErrorCategory, ReportsError};
///
/// let error = ReportsError::metadata("no columns were requested");
/// assert_eq!(error.category(), ErrorCategory::Validation);
/// assert_eq!(error.status_code().as_u16(), 400);
/// ```
#[derive(Error, Debug)]
pub enum ReportsError {
    /// The request failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The report metadata is unusable.
    #[error("Invalid report metadata: {message}")]
    Metadata {
        /// Human-readable error message.
        message: String,
        /// The offending field identifier, if any.
        field: Option<String>,
    },

    /// The requested export format is not supported.
    #[error("Unsupported export format '{format}'")]
    UnsupportedFormat {
        /// The format as it was requested.
        format: String,
    },

    /// A route or resource was not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The data repository failed to produce entities.
    #[error("Repository error: {message}")]
    Repository {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The renderer failed to produce a document.
    #[error("Rendering error: {message}")]
    Rendering {
        /// Human-readable error message.
        message: String,
        /// The format being rendered.
        export_type: Option<ExportType>,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Writing the document to its sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request timed out.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },
}

impl ReportsError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a metadata error.
    #[must_use]
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a metadata error naming the offending field.
    #[must_use]
    pub fn metadata_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates an unsupported format error.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a repository error.
    #[must_use]
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a repository error with a source error.
    pub fn repository_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Repository {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a rendering error.
    #[must_use]
    pub fn rendering(message: impl Into<String>, export_type: ExportType) -> Self {
        Self::Rendering {
            message: message.into(),
            export_type: Some(export_type),
            source: None,
        }
    }

    /// Creates a rendering error with a source error.
    pub fn rendering_with_source(
        message: impl Into<String>,
        export_type: ExportType,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Rendering {
            message: message.into(),
            export_type: Some(export_type),
            source: Some(source.into()),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::Metadata { .. } | Self::UnsupportedFormat { .. } => {
                ErrorCategory::Validation
            }
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Repository { .. } => ErrorCategory::External,
            Self::Rendering { .. } | Self::Io(_) => ErrorCategory::Internal,
            Self::Timeout { .. } => ErrorCategory::Timeout,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Metadata { .. } => "INVALID_METADATA",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Repository { .. } => "REPOSITORY_ERROR",
            Self::Rendering { .. } => "RENDERING_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Metadata {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            Self::UnsupportedFormat { format } => Some(serde_json::json!({
                "format": format,
                "supported": ExportType::all().iter().map(ExportType::as_str).collect::<Vec<_>>(),
            })),
            Self::Rendering {
                export_type: Some(export_type),
                ..
            } => Some(serde_json::json!({ "format": export_type.as_str() })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
