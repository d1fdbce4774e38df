//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};
use serde::Serialize;

/// Builder for an in-memory request.
///
/// Header and body errors are kept until [`TestRequest::build`] so calls can
/// be chained.
///
/// ```rust
/// use folio_test::TestRequest;
///
/// let request = TestRequest::post("/reports/pdf")
///     .json(&serde_json::json!({"columns": {"name": "Name"}}))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method(), http::Method::POST);
/// assert_eq!(request.headers()["content-type"], "application/json");
/// ```
#[must_use]
#[derive(Debug)]
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest {
    /// Starts a request with any method.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(TestError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first header or body error, or `TestError::RequestBuild`
    /// for an invalid URI.
    pub fn build(self) -> Result<Request<Bytes>, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri.as_str())
            .body(self.body)
            .map_err(|e| TestError::RequestBuild(format!("invalid request: {e}")))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }

    fn fail(&mut self, error: TestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request() {
        let request = TestRequest::get("/health").build().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/health");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_raw_body_without_content_type() {
        let request = TestRequest::post("/reports/xls").body("{").build().unwrap();
        assert_eq!(request.body().as_ref(), b"{");
        assert!(request.headers().get("content-type").is_none());
    }

    #[test]
    fn test_invalid_header_reported_on_build() {
        let err = TestRequest::get("/")
            .header("bad header", "value")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequest::get("http://[::1").build().unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }
}
