//! The report export resource.
//!
//! Mounts `POST {base}/{format}` and `POST {base}/{format}/alternative`.
//! Both routes behave identically: the request is extracted into a
//! [`ReportRequest`], exported through the [`ReportsService`] and returned
//! as an attachment.

use bytes::Bytes;
use folio_core::{ReportsService, RequestId};
use folio_extract::response::{DocumentResponse, ErrorResponse};
use folio_extract::{ExtractionContext, ReportRequest};
use folio_telemetry::metrics::record_export;
use folio_telemetry::ExportOutcome;
use http::{Method, Response};
use std::sync::Arc;
use std::time::Instant;

/// Suffix of the alias route.
pub const ALTERNATIVE_SUFFIX: &str = "alternative";

/// Export endpoints backed by a [`ReportsService`].
#[derive(Clone)]
pub struct ReportsResource {
    service: Arc<dyn ReportsService>,
    base_path: String,
    max_body_bytes: usize,
}

impl std::fmt::Debug for ReportsResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportsResource")
            .field("base_path", &self.base_path)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl ReportsResource {
    /// Creates the resource under `base_path`.
    #[must_use]
    pub fn new(
        service: Arc<dyn ReportsService>,
        base_path: impl Into<String>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            service,
            base_path: base_path.into(),
            max_body_bytes,
        }
    }

    /// Method and path template of each export route.
    #[must_use]
    pub fn routes(&self) -> [(Method, String); 2] {
        let primary = format!("{}/{{format}}", self.base_path);
        let alternative = format!("{primary}/{ALTERNATIVE_SUFFIX}");
        [(Method::POST, primary), (Method::POST, alternative)]
    }

    /// Handles one export request.
    ///
    /// Extraction failures become 400, 413 or 415 responses. Export failures
    /// use the status of their error category.
    pub async fn export(&self, ctx: &ExtractionContext, request_id: RequestId) -> Response<Bytes> {
        let request = match ReportRequest::from_request_with_limit(ctx, self.max_body_bytes) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(
                    request_id = %request_id,
                    source = %err.extraction_source(),
                    error = %err,
                    "rejected export request"
                );
                return ErrorResponse::from_extraction_error(&err)
                    .with_request_id(request_id.to_string())
                    .into_response();
            }
        };

        let export_type = request.export_type;
        let started = Instant::now();
        let result = self
            .service
            .export(
                &request.metadata,
                export_type,
                request.filters.as_ref(),
                request.sort.as_ref(),
            )
            .await;

        match result {
            Ok(report) => {
                record_export(export_type, ExportOutcome::Success, started.elapsed(), report.len());
                tracing::debug!(
                    request_id = %request_id,
                    format = %export_type,
                    columns = request.metadata.column_count(),
                    file_name = report.file_name(),
                    "sending document"
                );
                DocumentResponse::new(report).into_response()
            }
            Err(err) => {
                record_export(export_type, ExportOutcome::Failure, started.elapsed(), 0);
                tracing::error!(
                    request_id = %request_id,
                    format = %export_type,
                    error_code = err.error_code(),
                    error = %err,
                    "report export failed"
                );
                ErrorResponse::from_reports_error(&err)
                    .with_request_id(request_id.to_string())
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{ExportType, Filters, ReportMetadata, ReportsError, ReportsResult, Sort};
    use http::StatusCode;
    use std::io::Write;

    struct EchoService;

    #[async_trait]
    impl ReportsService for EchoService {
        async fn export_from(
            &self,
            metadata: &ReportMetadata,
            export_type: ExportType,
            _filters: Option<&Filters>,
            _sort: Option<&Sort>,
            sink: &mut (dyn Write + Send),
        ) -> ReportsResult<()> {
            let line = format!("{export_type}:{}", metadata.field_metadata().join(","));
            sink.write_all(line.as_bytes())
                .map_err(|e| ReportsError::rendering(e.to_string(), export_type))
        }
    }

    /// Fails every export with the error it builds.
    struct FailingService(fn(ExportType) -> ReportsError);

    #[async_trait]
    impl ReportsService for FailingService {
        async fn export_from(
            &self,
            _metadata: &ReportMetadata,
            export_type: ExportType,
            _filters: Option<&Filters>,
            _sort: Option<&Sort>,
            _sink: &mut (dyn Write + Send),
        ) -> ReportsResult<()> {
            Err((self.0)(export_type))
        }
    }

    fn resource(service: Arc<dyn ReportsService>) -> ReportsResource {
        ReportsResource::new(service, "/reports", 1024)
    }

    fn ctx(format: &str, body: &'static str) -> ExtractionContext {
        ExtractionContext::builder()
            .header("content-type", "application/json")
            .path_param("format", format)
            .body(body)
            .build()
    }

    #[test]
    fn test_routes() {
        let routes = resource(Arc::new(EchoService)).routes();
        assert_eq!(routes[0], (Method::POST, "/reports/{format}".to_string()));
        assert_eq!(
            routes[1],
            (Method::POST, "/reports/{format}/alternative".to_string())
        );
    }

    #[tokio::test]
    async fn test_export_success() {
        let response = resource(Arc::new(EchoService))
            .export(
                &ctx("xls", r#"{"columns": {"name": "Name", "age": "Age"}}"#),
                RequestId::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/vnd.ms-xls");
        assert_eq!(response.body().as_ref(), b"xls:name,age");
    }

    #[tokio::test]
    async fn test_empty_object_is_bad_request() {
        let id = RequestId::new();
        let response = resource(Arc::new(EchoService)).export(&ctx("pdf", "{}"), id).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["request_id"], id.to_string());
    }

    #[tokio::test]
    async fn test_body_limit() {
        let response = ReportsResource::new(Arc::new(EchoService), "/reports", 8)
            .export(&ctx("pdf", r#"{"columns": {"name": "Name"}}"#), RequestId::new())
            .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_service_failure_maps_to_category_status() {
        let response = resource(Arc::new(FailingService(|_| {
            ReportsError::repository("connection refused")
        })))
            .export(&ctx("pdf", r#"{"columns": {"name": "Name"}}"#), RequestId::new())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["category"], "external");
    }

    #[tokio::test]
    async fn test_rendering_failure_is_internal_error() {
        let id = RequestId::new();
        let response = resource(Arc::new(FailingService(|export_type| {
            ReportsError::rendering("font table missing", export_type)
        })))
        .export(&ctx("pdf", r#"{"columns": {"name": "Name"}}"#), id)
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "RENDERING_ERROR");
        assert_eq!(body["error"]["category"], "internal");
        assert_eq!(body["request_id"], id.to_string());
    }
}
