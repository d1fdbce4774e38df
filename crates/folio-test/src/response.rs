//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use folio_core::{ExportType, REQUEST_ID_HEADER};
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;

/// A buffered response with assertion helpers.
///
/// Assertion methods panic with a descriptive message and return `&Self`
/// so they can be chained.
///
/// ```rust
/// use folio_test::TestResponse;
/// use http::{HeaderMap, StatusCode};
///
/// let response = TestResponse::new(StatusCode::OK, HeaderMap::new(), "ok".into());
/// response.assert_status(StatusCode::OK).assert_body_contains("ok");
/// ```
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// A header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// The `x-request-id` header.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header_str(REQUEST_ID_HEADER)
    }

    /// Raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Body deserialized from JSON.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body does not deserialize.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Asserts the status code.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header has the expected value.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected, "header '{name}'");
        self
    }

    /// Asserts that the content type starts with `expected`.
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self
            .content_type()
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{expected}', got '{actual}'"
        );
        self
    }

    /// Asserts that the body contains `expected`.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = String::from_utf8_lossy(&self.body);
        assert!(
            body.contains(expected),
            "body should contain '{expected}', got: {body}"
        );
        self
    }

    /// Asserts a successful export: status 200, the format's content type
    /// and a non-empty body.
    pub fn assert_document(&self, export_type: ExportType) -> &Self {
        self.assert_status(StatusCode::OK)
            .assert_content_type(export_type.mime_type());
        assert!(!self.body.is_empty(), "{export_type} document is empty");
        self
    }

    /// Asserts an error envelope with the given status and error code.
    pub fn assert_error(&self, status: StatusCode, code: &str) -> &Self {
        self.assert_status(status)
            .assert_content_type("application/json");
        let envelope: serde_json::Value = self
            .json()
            .unwrap_or_else(|e| panic!("error body should be JSON: {e}"));
        assert_eq!(envelope["error"]["code"], code, "error code in {envelope}");
        self
    }
}

impl From<Response<Bytes>> for TestResponse {
    fn from(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}
