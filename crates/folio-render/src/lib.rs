//! # Folio Render
//!
//! Document renderers for Folio reports.
//!
//! - [`PdfRenderer`] - Paginated tabular PDF
//! - [`XlsRenderer`] - Excel 2003 XML spreadsheet
//! - [`DocumentRenderer`] - Dispatches on [`ExportType`]
//!
//! # Example
//!
//! ```
//! use folio_core::{ExportType, Renderer, ReportMetadata, ReportRow};
//! use folio_render::DocumentRenderer;
//!
//! let metadata = ReportMetadata::builder()
//!     .title("Employees")
//!     .column("firstName", "First name")
//!     .row(ReportRow::new().with("firstName", "Sad"))
//!     .build()
//!     .unwrap();
//!
//! let renderer = DocumentRenderer::default();
//! let pdf = renderer.render(&metadata, ExportType::Pdf).unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

#![doc(html_root_url = "https://docs.rs/folio-render/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pdf;
mod xls;

pub use pdf::PdfRenderer;
pub use xls::XlsRenderer;

use folio_core::{ExportType, Renderer, ReportMetadata, ReportsResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Title used when a report does not carry one.
pub const DEFAULT_TITLE: &str = "Report";

/// Default body font size, in points.
pub const DEFAULT_FONT_SIZE: u16 = 10;

/// Smallest accepted font size, in points.
pub const MIN_FONT_SIZE: u16 = 6;

/// Largest accepted font size, in points.
pub const MAX_FONT_SIZE: u16 = 24;

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

/// Defaults applied when a report's parameters do not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Title for reports without one.
    pub default_title: String,
    /// Page orientation for PDF output.
    pub orientation: Orientation,
    /// Body font size for PDF output.
    pub font_size: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            orientation: Orientation::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Renders every supported [`ExportType`] by delegating to the
/// format-specific renderer.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    pdf: PdfRenderer,
    xls: XlsRenderer,
}

impl DocumentRenderer {
    /// Creates a renderer using `options` for both formats.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            pdf: PdfRenderer::new(options.clone()),
            xls: XlsRenderer::new(options),
        }
    }
}

impl Renderer for DocumentRenderer {
    fn render(&self, metadata: &ReportMetadata, export_type: ExportType) -> ReportsResult<Vec<u8>> {
        match export_type {
            ExportType::Pdf => self.pdf.render(metadata, export_type),
            ExportType::Xls => self.xls.render(metadata, export_type),
        }
    }
}
