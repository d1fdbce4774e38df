//! The report export service.
//!
//! [`ReportsService`] is the generic "fetch, describe, render" contract for one
//! entity type. [`RepositoryReportsService`] implements it on top of a
//! [`Repository`] and a [`Renderer`].

use crate::error::{ReportsError, ReportsResult};
use crate::export::ExportType;
use crate::metadata::ReportMetadata;
use crate::query::{Filters, Sort};
use crate::render::Renderer;
use crate::reportable::Reportable;
use crate::repository::Repository;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

/// A rendered document held in memory.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    bytes: Bytes,
    export_type: ExportType,
    file_name: String,
}

impl RenderedReport {
    /// Wraps rendered bytes, deriving a file name from `title`.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, export_type: ExportType, title: Option<&str>) -> Self {
        let stem = title.map(slugify).filter(|s| !s.is_empty());
        Self {
            bytes: bytes.into(),
            export_type,
            file_name: format!(
                "{}.{}",
                stem.as_deref().unwrap_or("report"),
                export_type.extension()
            ),
        }
    }

    /// Returns the document bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consumes the report, returning the document bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Returns the format of the document.
    #[must_use]
    pub const fn export_type(&self) -> ExportType {
        self.export_type
    }

    /// Returns the `Content-Type` of the document.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.export_type.mime_type()
    }

    /// Returns a suggested download file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the document size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Exports entities of one type to rendered documents.
#[async_trait]
pub trait ReportsService: Send + Sync {
    /// Fetches the entities matching `filters` and `sort`, renders them as
    /// described by `metadata` and writes the document to `sink`.
    ///
    /// With neither filters nor sort, every entity is exported in natural
    /// order. The data source of `metadata` is replaced by the fetched rows.
    ///
    /// # Errors
    ///
    /// Fails with a metadata error when `metadata` maps no fields, with a
    /// repository error when fetching fails, and with a rendering or I/O error
    /// when producing or writing the document fails. The content of `sink`
    /// is unspecified after a failure.
    async fn export_from(
        &self,
        metadata: &ReportMetadata,
        export_type: ExportType,
        filters: Option<&Filters>,
        sort: Option<&Sort>,
        sink: &mut (dyn Write + Send),
    ) -> ReportsResult<()>;

    /// Like [`ReportsService::export_from`], rendering into memory.
    async fn export(
        &self,
        metadata: &ReportMetadata,
        export_type: ExportType,
        filters: Option<&Filters>,
        sort: Option<&Sort>,
    ) -> ReportsResult<RenderedReport> {
        let mut buffer = Vec::new();
        self.export_from(metadata, export_type, filters, sort, &mut buffer)
            .await?;
        Ok(RenderedReport::new(buffer, export_type, metadata.title()))
    }
}

/// [`ReportsService`] backed by a [`Repository`] and a [`Renderer`].
pub struct RepositoryReportsService<T> {
    repository: Arc<dyn Repository<T>>,
    renderer: Arc<dyn Renderer>,
}

impl<T> RepositoryReportsService<T>
where
    T: Reportable + 'static,
{
    /// Creates a service exporting entities from `repository`.
    pub fn new(repository: Arc<dyn Repository<T>>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            repository,
            renderer,
        }
    }

    async fn fetch(&self, filters: Option<&Filters>, sort: Option<&Sort>) -> ReportsResult<Vec<T>> {
        if filters.is_none() && sort.is_none() {
            self.repository.find_all().await
        } else {
            self.repository.find_all_matching(filters, sort).await
        }
    }
}

impl<T> std::fmt::Debug for RepositoryReportsService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryReportsService")
            .field("entity", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> ReportsService for RepositoryReportsService<T>
where
    T: Reportable + 'static,
{
    async fn export_from(
        &self,
        metadata: &ReportMetadata,
        export_type: ExportType,
        filters: Option<&Filters>,
        sort: Option<&Sort>,
        sink: &mut (dyn Write + Send),
    ) -> ReportsResult<()> {
        let started = Instant::now();
        metadata.validate_for_export()?;
        if !self.renderer.supports(export_type) {
            return Err(ReportsError::unsupported_format(export_type.as_str()));
        }

        let entities = self.fetch(filters, sort).await?;
        tracing::debug!(
            format = %export_type,
            entities = entities.len(),
            filtered = filters.is_some(),
            sorted = sort.is_some(),
            "Fetched entities for export"
        );

        let rows = {
            let fields = metadata.field_metadata();
            entities.iter().map(|entity| entity.to_row(&fields)).collect()
        };
        let populated = metadata.clone().into_builder().data_source(rows).build()?;

        let renderer = Arc::clone(&self.renderer);
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&populated, export_type))
            .await
            .map_err(|e| {
                ReportsError::rendering_with_source("renderer task failed", export_type, e)
            })??;

        sink.write_all(&bytes)?;
        sink.flush()?;

        tracing::info!(
            format = %export_type,
            rows = entities.len(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Report exported"
        );
        Ok(())
    }
}
