//! Response builders for the report endpoints.
//!
//! | Builder | Content-Type | Description |
//! |---------|--------------|-------------|
//! | [`DocumentResponse`] | format MIME type | Rendered report, as an attachment |
//! | [`JsonResponse`] | `application/json` | JSON serialized response |
//! | [`ErrorResponse`] | `application/json` | Error envelope |

use crate::ExtractionError;
use bytes::Bytes;
use folio_core::{ErrorCategory, ErrorDetail, ErrorEnvelope, RenderedReport, ReportsError};
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Rendered document response.
///
/// Served with status 200, the format's content type, a `Content-Length` and
/// a `Content-Disposition: attachment` header naming the file.
///
/// # Example
///
/// ```rust
/// use folio_core::{ExportType, RenderedReport};
/// use folio_extract::response::DocumentResponse;
///
/// let report = RenderedReport::new(b"%PDF-1.5".to_vec(), ExportType::Pdf, Some("Staff"));
/// let response = DocumentResponse::new(report).into_response();
///
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.headers()["content-type"], "application/pdf");
/// assert_eq!(
///     response.headers()["content-disposition"],
///     "attachment; filename=\"staff.pdf\""
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DocumentResponse {
    report: RenderedReport,
}

impl DocumentResponse {
    /// Wraps a rendered report.
    #[must_use]
    pub fn new(report: RenderedReport) -> Self {
        Self { report }
    }

    /// Returns the status code (always 200).
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::OK
    }

    /// Builds the HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let content_type = HeaderValue::from_static(self.report.content_type());
        let disposition =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", self.report.file_name()))
                .ok();
        let length = HeaderValue::from(self.report.len());

        let mut response = Response::new(self.report.into_bytes());
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(header::CONTENT_LENGTH, length);
        if let Some(disposition) = disposition {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }
        response
    }
}

/// JSON response builder.
///
/// # Example
///
/// ```rust
/// use folio_extract::response::JsonResponse;
///
/// let response = JsonResponse::new(serde_json::json!({ "status": "healthy" }));
/// assert_eq!(response.status(), http::StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct JsonResponse<T> {
    data: T,
    status: StatusCode,
}

impl<T: Serialize> JsonResponse<T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Builds the HTTP response.
    ///
    /// A value that cannot be serialized yields a 500 with an empty body.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let (status, body) = match serde_json::to_vec(&self.data) {
            Ok(body) => (self.status, Bytes::from(body)),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Bytes::new()),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, APPLICATION_JSON);
        response
    }
}

/// Error response builder producing the standard error envelope.
///
/// # Example
///
/// ```rust
/// use folio_core::ReportsError;
/// use folio_extract::response::ErrorResponse;
/// use http::StatusCode;
///
/// let response = ErrorResponse::from_reports_error(&ReportsError::not_found("no route"))
///     .with_request_id("req-1");
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl ErrorResponse {
    /// Creates an error response from its parts.
    #[must_use]
    pub fn new(
        status: StatusCode,
        category: ErrorCategory,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            envelope: ErrorEnvelope {
                error: ErrorDetail {
                    code: code.into(),
                    message: message.into(),
                    category,
                    details: None,
                },
                request_id: None,
            },
        }
    }

    /// Creates an error response for a failed export.
    #[must_use]
    pub fn from_reports_error(err: &ReportsError) -> Self {
        Self {
            status: err.status_code(),
            envelope: err.to_envelope(None),
        }
    }

    /// Creates an error response for a failed extraction.
    #[must_use]
    pub fn from_extraction_error(err: &ExtractionError) -> Self {
        let status = err.status_code();
        let mut response = Self::new(status, ErrorCategory::Validation, err.error_code(), err.to_string());
        if let Some(field) = err.field() {
            response.envelope.error.details = Some(serde_json::json!({
                "source": err.extraction_source().to_string(),
                "field": field,
            }));
        }
        response
    }

    /// Sets the request ID for error tracking.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.envelope.request_id = Some(request_id.into());
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the envelope that will be serialized.
    #[must_use]
    pub fn envelope(&self) -> &ErrorEnvelope {
        &self.envelope
    }

    /// Builds the HTTP response with the JSON error envelope.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        JsonResponse::new(self.envelope)
            .with_status(self.status)
            .into_response()
    }
}
