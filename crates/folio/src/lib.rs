//! # Folio
//!
//! **Report export service**
//!
//! Folio exposes REST endpoints that export the entities of a repository as
//! PDF or spreadsheet documents:
//!
//! - `POST /reports/{format}` with `{format}` one of `pdf` or `xls`
//! - `POST /reports/{format}/alternative`, an alias of the above
//!
//! The JSON body names the columns and may restrict and order the exported
//! entities:
//!
//! ```json
//! {
//!   "title": "Employees",
//!   "fieldsAndTableColumnMetadata": { "firstName": "First name", "lastName": "Last name" },
//!   "filters": [ { "field": "lastName", "operator": "eq", "value": "Panda" } ],
//!   "sort": [ { "property": "firstName", "direction": "desc" } ]
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use folio::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_env_prefix("FOLIO").load()?;
//!     let repository: Arc<dyn Repository<Employee>> =
//!         Arc::new(InMemoryRepository::new(employees()));
//!
//!     folio::build_server(&config, repository)?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Router → ReportRequest → ReportsResource → ReportsService
//!                                                          ↓
//! Response ← DocumentResponse ← Renderer ← ReportMetadata ← Repository
//! ```

#![doc(html_root_url = "https://docs.rs/folio/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compose;

pub use compose::{build_server, reports_service, server_config};

pub use folio_config as config;
pub use folio_core as core;
pub use folio_extract as extract;
pub use folio_render as render;
pub use folio_server as server;
pub use folio_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use folio::prelude::*;
/// ```
pub mod prelude {
    pub use folio_core::{
        Direction, ExportType, Filter, FilterOperator, Filters, InMemoryRepository, Order,
        RenderedReport, Renderer, ReportMetadata, ReportRow, Reportable, ReportsError,
        ReportsResult, ReportsService, Repository, RepositoryReportsService, RequestId, Sort,
    };

    pub use folio_render::{DocumentRenderer, Orientation, RenderOptions};

    pub use folio_config::{ConfigLoader, FolioConfig};

    pub use folio_server::{Server, ShutdownSignal};

    pub use crate::{build_server, reports_service};

    pub use std::sync::Arc;
}
