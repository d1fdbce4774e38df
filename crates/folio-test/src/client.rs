//! In-memory test client.

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;
use folio_core::ReportsService;
use folio_server::{Server, ServerConfig, ServerError};
use http::Method;
use std::sync::Arc;

/// Sends requests straight to [`Server::dispatch`], without binding a port.
///
/// Requests run through routing, extraction, export and error mapping
/// exactly as they would over HTTP.
#[derive(Debug, Clone)]
pub struct TestClient {
    server: Arc<Server>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a built server.
    #[must_use]
    pub fn new(server: Server) -> Self {
        Self {
            server: Arc::new(server),
            default_headers: Vec::new(),
        }
    }

    /// Builds a server with `config` around `service`.
    ///
    /// # Errors
    ///
    /// Returns the server build error, e.g. for an invalid base path.
    pub fn with_config(
        service: Arc<dyn ReportsService>,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        Server::builder(service).config(config).build().map(Self::new)
    }

    /// Builds a server with the default configuration around `service`.
    ///
    /// # Errors
    ///
    /// Returns the server build error.
    pub fn from_service(service: Arc<dyn ReportsService>) -> Result<Self, ServerError> {
        Self::with_config(service, ServerConfig::default())
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The wrapped server.
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut request = TestRequest::new(method, uri);
        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }
        TestClientRequest {
            client: self,
            request,
        }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.request = self.request.content_type(content_type);
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.request = self.request.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build errors.
    ///
    /// # Errors
    ///
    /// Returns the request build error.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.request.build()?;
        Ok(self.client.server.dispatch(request).await.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{ExportType, Filters, ReportMetadata, ReportsResult, Sort};
    use http::StatusCode;
    use serde_json::json;
    use std::io::Write;

    struct TitleService;

    #[async_trait]
    impl ReportsService for TitleService {
        async fn export_from(
            &self,
            metadata: &ReportMetadata,
            _export_type: ExportType,
            _filters: Option<&Filters>,
            _sort: Option<&Sort>,
            sink: &mut (dyn Write + Send),
        ) -> ReportsResult<()> {
            sink.write_all(metadata.title_or("untitled").as_bytes())?;
            Ok(())
        }
    }

    fn client() -> TestClient {
        TestClient::from_service(Arc::new(TitleService)).unwrap()
    }

    #[tokio::test]
    async fn test_post_json() {
        let response = client()
            .post("/reports/pdf")
            .json(&json!({"title": "Staff", "columns": {"name": "Name"}}))
            .send()
            .await;

        response.assert_document(ExportType::Pdf);
        assert_eq!(response.text().unwrap(), "Staff");
    }

    #[tokio::test]
    async fn test_default_header_sent() {
        let id = "0192f5e4-8d3c-7a6b-9c1d-2e3f4a5b6c7d";
        let client = client().with_default_header("x-request-id", id);

        let response = client.get("/health").send().await;
        response
            .assert_status(StatusCode::OK)
            .assert_header("x-request-id", id);
    }

    #[tokio::test]
    async fn test_try_send_reports_build_error() {
        let result = client()
            .post("/reports/pdf")
            .header("bad header", "x")
            .try_send()
            .await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
