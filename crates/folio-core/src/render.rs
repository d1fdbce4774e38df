//! Document renderer collaborator.

use crate::error::ReportsResult;
use crate::export::ExportType;
use crate::metadata::ReportMetadata;

/// Turns report metadata into document bytes.
///
/// Rendering is synchronous and CPU-bound. Callers on an async runtime should
/// run it on a blocking thread.
pub trait Renderer: Send + Sync {
    /// Renders `metadata` in the requested format.
    ///
    /// The data source is rendered as-is. An empty data source yields a
    /// document holding only the title and the column headers.
    fn render(&self, metadata: &ReportMetadata, export_type: ExportType) -> ReportsResult<Vec<u8>>;

    /// Returns `true` if this renderer can produce `export_type`.
    fn supports(&self, export_type: ExportType) -> bool {
        let _ = export_type;
        true
    }
}
