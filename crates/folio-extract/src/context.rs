//! The request view extractors read from.
//!
//! An [`ExtractionContext`] owns a fully buffered `http::Request<Bytes>`
//! together with the path parameters captured by the router.

use crate::Params;
use bytes::Bytes;
use http::request::Parts;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};

/// A buffered request plus its matched path parameters.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use folio_extract::{ExtractionContext, Params};
/// use http::{Method, Request};
///
/// let request = Request::post("/reports/pdf")
///     .body(Bytes::from_static(b"{}"))
///     .unwrap();
/// let params: Params = [("format".to_string(), "pdf".to_string())].into_iter().collect();
///
/// let ctx = ExtractionContext::new(request, params);
///
/// assert_eq!(ctx.method(), &Method::POST);
/// assert_eq!(ctx.path_params().get("format"), Some("pdf"));
/// ```
#[derive(Debug)]
pub struct ExtractionContext {
    request: Request<Bytes>,
    path_params: Params,
}

impl ExtractionContext {
    /// Wraps a buffered request.
    #[must_use]
    pub fn new(request: Request<Bytes>, path_params: Params) -> Self {
        Self {
            request,
            path_params,
        }
    }

    /// Reassembles a request split by the server while reading its body.
    #[must_use]
    pub fn from_parts(parts: Parts, body: Bytes, path_params: Params) -> Self {
        Self::new(Request::from_parts(parts, body), path_params)
    }

    /// Starts a `POST /` context with no headers and an empty body.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder::default()
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// Path portion of the URI, without the query.
    #[must_use]
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Buffered body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    /// Parameters captured from `{name}` path segments.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// A header as text. Values that are not visible ASCII read as `None`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// `true` when the body holds nothing but ASCII whitespace.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body().iter().all(u8::is_ascii_whitespace)
    }
}

/// Builder for an [`ExtractionContext`], mostly used in tests.
#[derive(Debug)]
pub struct ExtractionContextBuilder {
    request: Request<Bytes>,
    path_params: Params,
}

impl Default for ExtractionContextBuilder {
    fn default() -> Self {
        let mut request = Request::new(Bytes::new());
        *request.method_mut() = Method::POST;
        Self {
            request,
            path_params: Params::new(),
        }
    }
}

impl ExtractionContextBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        *self.request.uri_mut() = uri;
        self
    }

    /// Sets a header. Invalid values are skipped.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.request
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        *self.request.body_mut() = body.into();
        self
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Finishes the context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext::new(self.request, self.path_params)
    }
}
