//! # Folio Extract
//!
//! Request extractors and response builders for the Folio report endpoints.
//!
//! ## Extractors
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`Format`] | URL path | Export format from the `{format}` segment |
//! | [`Json<T>`] | Request body | Deserialize JSON body |
//! | [`ReportRequest`] | Path and body | Complete export request |
//!
//! ## Example
//!
//! ```rust
//! use folio_core::ExportType;
//! use folio_extract::{ExtractionContext, FromRequest, ReportRequest};
//!
//! let ctx = ExtractionContext::builder()
//!     .header("content-type", "application/json")
//!     .path_param("format", "pdf")
//!     .body(r#"{"title": "Staff", "columns": {"name": "Name"}}"#)
//!     .build();
//!
//! let request = ReportRequest::from_request(&ctx).unwrap();
//! assert_eq!(request.export_type, ExportType::Pdf);
//! assert_eq!(request.metadata.title(), Some("Staff"));
//! ```
//!
//! ## Error Handling
//!
//! All extractors return [`ExtractionError`] on failure. It records where the
//! failure happened and maps to a 400, 413 or 415 response:
//!
//! ```rust
//! use folio_extract::{ExtractionError, ExtractionSource};
//!
//! let err = ExtractionError::unsupported_format("wrong");
//! assert_eq!(err.extraction_source(), ExtractionSource::Path);
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! ```

#![doc(html_root_url = "https://docs.rs/folio-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extractor;
mod json;
mod params;
mod report;
pub mod response;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use extractor::FromRequest;
pub use json::{parse_body, Json, DEFAULT_MAX_BODY_SIZE};
pub use params::Params;
pub use report::{Format, ReportRequest, COLUMNS_FIELD, FORMAT_PARAM};
