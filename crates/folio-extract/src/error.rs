//! Extraction error types.

use folio_core::ReportsError;
use http::StatusCode;
use std::fmt;

/// Where data was being extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path parameters (e.g., `/reports/{format}`)
    Path,
    /// Request body
    Body,
    /// Content-Type header
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error that occurs during extraction.
///
/// # Example
///
/// ```rust
/// use folio_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "format");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Path);
/// assert!(err.to_string().contains("format"));
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Required field or parameter is missing
    Missing,
    /// Deserialization failed
    DeserializationFailed,
    /// Body is too large
    PayloadTooLarge,
    /// Content-Type is unsupported
    UnsupportedMediaType,
    /// Export format is unsupported
    UnsupportedFormat,
    /// Report description is unusable
    InvalidReport,
}

impl ExtractionError {
    /// Creates an error for a missing field or parameter.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Missing,
            message: format!("missing required {source} parameter: {field}"),
            field: Some(field),
        }
    }

    /// Creates an error for deserialization failure.
    #[must_use]
    pub fn deserialization_failed(source: ExtractionSource, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize {source}: {error}"),
            field: None,
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
        }
    }

    /// Creates an error for unsupported content type.
    #[must_use]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual_str = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type: expected '{expected}', got '{actual_str}'"),
            field: None,
        }
    }

    /// Creates an error for an export format that is not supported.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        let format = format.into();
        Self {
            extraction_source: ExtractionSource::Path,
            kind: ExtractionErrorKind::UnsupportedFormat,
            message: format!("unsupported export format '{format}'"),
            field: Some("format".to_string()),
        }
    }

    /// Creates an error for a report description that cannot be exported.
    #[must_use]
    pub fn invalid_report(field: Option<String>, message: impl Into<String>) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::InvalidReport,
            message: message.into(),
            field,
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::DeserializationFailed
            | ExtractionErrorKind::UnsupportedFormat
            | ExtractionErrorKind::InvalidReport => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ExtractionErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ExtractionErrorKind::InvalidReport => "INVALID_METADATA",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ReportsError> for ExtractionError {
    fn from(err: ReportsError) -> Self {
        match err {
            ReportsError::UnsupportedFormat { format } => Self::unsupported_format(format),
            ReportsError::Metadata { message, field } => Self::invalid_report(field, message),
            other => Self::invalid_report(None, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_error() {
        let err = ExtractionError::missing(ExtractionSource::Body, "fieldsAndTableColumnMetadata");

        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.field(), Some("fieldsAndTableColumnMetadata"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_deserialization_failed_error() {
        let err = ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "expected value at line 1 column 1",
        );

        assert_eq!(err.field(), None);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "DESERIALIZATION_FAILED");
    }

    #[test]
    fn test_payload_too_large_error() {
        let err = ExtractionError::payload_too_large(1024, 2048);

        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_unsupported_media_type_error() {
        let err = ExtractionError::unsupported_media_type("application/json", Some("text/plain"));

        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_unsupported_format_is_bad_request() {
        let err = ExtractionError::unsupported_format("wrong");
        assert_eq!(err.extraction_source(), ExtractionSource::Path);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(err.to_string().contains("wrong"));
    }

    #[test]
    fn test_from_reports_error() {
        let err: ExtractionError =
            ReportsError::metadata_field("field 'a' is mapped more than once", "a").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_METADATA");
        assert_eq!(err.field(), Some("a"));

        let err: ExtractionError = ReportsError::unsupported_format("doc").into();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Path.to_string(), "path");
        assert_eq!(ExtractionSource::Body.to_string(), "body");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
