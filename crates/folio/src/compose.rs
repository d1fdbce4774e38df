//! Wiring a [`FolioConfig`] into a running server.

use folio_config::FolioConfig;
use folio_core::{Reportable, ReportsService, Repository, RepositoryReportsService};
use folio_render::DocumentRenderer;
use folio_server::{Server, ServerResult};
use std::sync::Arc;
use std::time::Duration;

/// HTTP settings described by `config`.
#[must_use]
pub fn server_config(config: &FolioConfig) -> folio_server::ServerConfig {
    folio_server::ServerConfig::builder()
        .http_addr(&config.server.http_addr)
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .max_body_bytes(config.server.max_body_bytes)
        .base_path(&config.reports.base_path)
        .service_name(&config.telemetry.service_name)
        .build()
}

/// Export service over `repository`, rendering with the configured defaults.
pub fn reports_service<T>(
    config: &FolioConfig,
    repository: Arc<dyn Repository<T>>,
) -> Arc<dyn ReportsService>
where
    T: Reportable + 'static,
{
    let renderer = Arc::new(DocumentRenderer::new(config.reports.render_options()));
    Arc::new(RepositoryReportsService::new(repository, renderer))
}

/// Builds the server exporting entities from `repository`.
///
/// # Errors
///
/// Returns `ServerError::InvalidRoute` if the configured base path yields
/// invalid routes.
pub fn build_server<T>(config: &FolioConfig, repository: Arc<dyn Repository<T>>) -> ServerResult<Server>
where
    T: Reportable + 'static,
{
    Server::builder(reports_service(config, repository))
        .config(server_config(config))
        .build()
}
