//! # Folio Core
//!
//! Core types and traits for the Folio report export service.
//!
//! - [`ReportMetadata`] - Title, field to column mapping, rows and renderer parameters
//! - [`ExportType`] - Supported document formats
//! - [`Filters`] / [`Sort`] - Query criteria forwarded to the repository
//! - [`Reportable`] - Per-entity field access
//! - [`Repository`] / [`Renderer`] - Collaborator traits
//! - [`ReportsService`] - The export contract
//! - [`ReportsError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/folio-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod export;
pub mod metadata;
pub mod query;
mod render;
mod reportable;
mod repository;
mod service;

pub use context::{RequestId, REQUEST_ID_HEADER};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, ReportsError, ReportsResult};
pub use export::{ExportType, ParseExportTypeError};
pub use metadata::{ReportMetadata, ReportMetadataBuilder, ReportRow};
pub use query::{Direction, Filter, FilterOperator, Filters, Order, Sort};
pub use render::Renderer;
pub use reportable::Reportable;
pub use repository::{InMemoryRepository, Repository};
pub use service::{RenderedReport, ReportsService, RepositoryReportsService};
