//! Supported export formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The target document format of an export.
///
/// Parsed from the `{format}` path segment, case-insensitively.
///
/// # Example
///
/// ```
/// use folio_core::ExportType;
///
/// let format: ExportType = "PDF".parse().unwrap();
/// assert_eq!(format, ExportType::Pdf);
/// assert_eq!(format.mime_type(), "application/pdf");
/// assert!("wrong".parse::<ExportType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    /// Portable Document Format.
    Pdf,
    /// Excel spreadsheet.
    Xls,
}

impl ExportType {
    /// Returns every supported export type.
    #[must_use]
    pub const fn all() -> &'static [ExportType] {
        &[Self::Pdf, Self::Xls]
    }

    /// Returns the path segment naming this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xls => "xls",
        }
    }

    /// Returns the `Content-Type` served for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Xls => "application/vnd.ms-xls",
        }
    }

    /// Returns the file extension, without the leading dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a supported export type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported export format '{0}'")]
pub struct ParseExportTypeError(pub String);

impl FromStr for ExportType {
    type Err = ParseExportTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseExportTypeError(s.to_string()))
    }
}

impl From<ParseExportTypeError> for crate::ReportsError {
    fn from(err: ParseExportTypeError) -> Self {
        Self::unsupported_format(err.0)
    }
}
