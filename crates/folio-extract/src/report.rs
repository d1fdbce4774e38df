//! Report request extraction.
//!
//! [`ReportRequest`] resolves everything an export endpoint needs from one
//! request: the export format from the `{format}` path segment and the report
//! description, filters and sort from the JSON body.
//!
//! The body accepts the metadata fields at the top level or nested under
//! `metadata`:
//!
//! ```json
//! {
//!   "title": "Employees",
//!   "fieldsAndTableColumnMetadata": { "firstName": "First name" },
//!   "parametersMap": { "orientation": "landscape" },
//!   "filters": [ { "field": "lastName", "operator": "eq", "value": "Panda" } ],
//!   "sort": [ { "property": "firstName", "direction": "desc" } ]
//! }
//! ```
//!
//! `columns` and `parameters` are accepted as shorter names.

use crate::json::{parse_body, DEFAULT_MAX_BODY_SIZE};
use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use folio_core::{ExportType, Filters, ReportMetadata, Sort};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Name of the path parameter carrying the export format.
pub const FORMAT_PARAM: &str = "format";

/// Body field naming the column mapping.
pub const COLUMNS_FIELD: &str = "fieldsAndTableColumnMetadata";

/// Extractor for the `{format}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format(pub ExportType);

impl FromRequest for Format {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let raw = ctx
            .path_params()
            .get(FORMAT_PARAM)
            .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, FORMAT_PARAM))?;
        raw.parse::<ExportType>()
            .map(Format)
            .map_err(|_| ExtractionError::unsupported_format(raw))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "columns")]
    fields_and_table_column_metadata: Option<IndexMap<String, String>>,
    #[serde(default, alias = "parameters")]
    parameters_map: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequestBody {
    #[serde(default)]
    metadata: Option<MetadataBody>,
    #[serde(flatten)]
    inline: MetadataBody,
    #[serde(default)]
    filters: Option<Filters>,
    #[serde(default)]
    sort: Option<Sort>,
}

/// A fully resolved export request.
///
/// Empty `filters` or `sort` arrays are treated as absent.
///
/// # Example
///
/// ```rust
/// use folio_core::ExportType;
/// use folio_extract::{ExtractionContext, FromRequest, ReportRequest};
///
/// let ctx = ExtractionContext::builder()
///     .path_param("format", "xls")
///     .body(r#"{"fieldsAndTableColumnMetadata": {"firstName": "First name"}}"#)
///     .build();
///
/// let request = ReportRequest::from_request(&ctx).unwrap();
/// assert_eq!(request.export_type, ExportType::Xls);
/// assert_eq!(request.metadata.field_metadata(), vec!["firstName"]);
/// assert!(request.filters.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Report description, without a data source.
    pub metadata: ReportMetadata,
    /// Requested document format.
    pub export_type: ExportType,
    /// Restriction on the exported entities.
    pub filters: Option<Filters>,
    /// Ordering of the exported entities.
    pub sort: Option<Sort>,
}

impl ReportRequest {
    /// Extracts a report request, enforcing a body limit of `limit` bytes.
    pub fn from_request_with_limit(
        ctx: &ExtractionContext,
        limit: usize,
    ) -> Result<Self, ExtractionError> {
        let Format(export_type) = Format::from_request(ctx)?;
        let body: ReportRequestBody = parse_body(ctx, limit)?;

        let described = body.metadata.unwrap_or(body.inline);
        let columns = described
            .fields_and_table_column_metadata
            .filter(|columns| !columns.is_empty())
            .ok_or_else(|| ExtractionError::missing(ExtractionSource::Body, COLUMNS_FIELD))?;

        let metadata = ReportMetadata::builder()
            .maybe_title(described.title)
            .columns(columns)
            .parameters(described.parameters_map.unwrap_or_default())
            .build()?;

        Ok(Self {
            metadata,
            export_type,
            filters: body.filters.filter(|f| !f.is_empty()),
            sort: body.sort.filter(|s| !s.is_empty()),
        })
    }
}

impl FromRequest for ReportRequest {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Self::from_request_with_limit(ctx, DEFAULT_MAX_BODY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Direction, FilterOperator};
    use http::StatusCode;

    fn ctx(format: &str, body: &'static str) -> ExtractionContext {
        ExtractionContext::builder()
            .header("content-type", "application/json")
            .path_param("format", format)
            .body(body)
            .build()
    }

    const EMPLOYEES: &str = r#"{
        "title": "Employees",
        "fieldsAndTableColumnMetadata": { "firstName": "First name", "lastName": "Last name" },
        "parametersMap": { "orientation": "landscape" }
    }"#;

    #[test]
    fn test_extracts_metadata_in_order() {
        let request = ReportRequest::from_request(&ctx("pdf", EMPLOYEES)).unwrap();

        assert_eq!(request.export_type, ExportType::Pdf);
        assert_eq!(request.metadata.title(), Some("Employees"));
        assert_eq!(request.metadata.field_metadata(), vec!["firstName", "lastName"]);
        assert_eq!(
            request.metadata.table_column_metadata(),
            vec!["First name", "Last name"]
        );
        assert_eq!(request.metadata.parameter_str("orientation"), Some("landscape"));
        assert!(request.metadata.data_source().is_empty());
        assert!(request.filters.is_none());
        assert!(request.sort.is_none());
    }

    #[test]
    fn test_extracts_filters_and_sort() {
        let body = r#"{
            "columns": { "firstName": "First name" },
            "filters": [ { "field": "lastName", "operator": "starts_with", "value": "P" } ],
            "sort": [ { "property": "firstName", "direction": "desc" } ]
        }"#;
        let request = ReportRequest::from_request(&ctx("XLS", body)).unwrap();

        assert_eq!(request.export_type, ExportType::Xls);
        let filters = request.filters.unwrap();
        assert_eq!(filters.as_slice()[0].operator, FilterOperator::StartsWith);
        assert_eq!(request.sort.unwrap().orders()[0].direction, Direction::Desc);
    }

    #[test]
    fn test_nested_metadata_object() {
        let body = r#"{
            "metadata": { "title": "Nested", "fieldsAndTableColumnMetadata": { "a": "A" } },
            "sort": []
        }"#;
        let request = ReportRequest::from_request(&ctx("pdf", body)).unwrap();
        assert_eq!(request.metadata.title(), Some("Nested"));
        assert!(request.sort.is_none());
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let err = ReportRequest::from_request(&ctx("pdf", "")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = ReportRequest::from_request(&ctx("xls", r#"{"title": "#)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "DESERIALIZATION_FAILED");

        let err = ReportRequest::from_request(&ctx("xls", "[1, 2]")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_object_is_rejected() {
        let err = ReportRequest::from_request(&ctx("pdf", "{}")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field(), Some(COLUMNS_FIELD));

        let err = ReportRequest::from_request(&ctx(
            "pdf",
            r#"{"fieldsAndTableColumnMetadata": {}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_blank_label_is_rejected() {
        let err = ReportRequest::from_request(&ctx(
            "pdf",
            r#"{"fieldsAndTableColumnMetadata": {"firstName": ""}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_METADATA");
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let err = ReportRequest::from_request(&ctx("wrong", EMPLOYEES)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_missing_format_parameter() {
        let ctx = ExtractionContext::builder().body(EMPLOYEES).build();
        let err = Format::from_request(&ctx).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
    }
}
