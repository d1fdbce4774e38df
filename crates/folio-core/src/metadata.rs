//! Report metadata.
//!
//! A [`ReportMetadata`] value describes one export job: the document title,
//! the ordered mapping from entity field to column label, the rows to render
//! and free-form parameters handed to the renderer.
//!
//! Values are immutable once built. Use [`ReportMetadataBuilder`] to assemble
//! one, and [`ReportMetadata::into_builder`] to derive a new value, e.g. when
//! the export service attaches the fetched data source.
//!
//! # Example
//!
//! ```
//! use folio_core::ReportMetadata;
//!
//! let metadata = ReportMetadata::builder()
//!     .title("Employees")
//!     .column("firstName", "First name")
//!     .column("lastName", "Last name")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(metadata.field_metadata(), vec!["firstName", "lastName"]);
//! assert_eq!(metadata.table_column_metadata(), vec!["First name", "Last name"]);
//! ```

use crate::error::{ReportsError, ReportsResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record of the data source, keyed by field identifier.
///
/// Cells keep the order in which fields were inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow(IndexMap<String, Value>);

impl ReportRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a field, returning the row.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets the value of a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the cells for `fields`, in that order.
    ///
    /// Missing fields yield `None`.
    pub fn cells<'a>(&'a self, fields: &'a [&'a str]) -> impl Iterator<Item = Option<&'a Value>> {
        fields.iter().map(move |field| self.0.get(*field))
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ReportRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Formats a cell value for display in a rendered document.
///
/// Strings are shown without quotes, `null` and missing values as an empty
/// string, and composite values as compact JSON.
#[must_use]
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Description of a single export job.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    title: Option<String>,
    columns: IndexMap<String, String>,
    data_source: Vec<ReportRow>,
    parameters: IndexMap<String, Value>,
}

impl ReportMetadata {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ReportMetadataBuilder {
        ReportMetadataBuilder::default()
    }

    /// Converts this value back into a builder carrying the same contents.
    #[must_use]
    pub fn into_builder(self) -> ReportMetadataBuilder {
        ReportMetadataBuilder {
            title: self.title,
            columns: self.columns.into_iter().collect(),
            data_source: self.data_source,
            parameters: self.parameters,
        }
    }

    /// Returns the document title, if one was set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the document title, or `default` when none was set.
    #[must_use]
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(default)
    }

    /// Returns the ordered field identifier to column label mapping.
    #[must_use]
    pub const fn fields_and_table_column_metadata(&self) -> &IndexMap<String, String> {
        &self.columns
    }

    /// Returns the field identifiers, in column order.
    #[must_use]
    pub fn field_metadata(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Returns the column labels, index-aligned with [`Self::field_metadata`].
    #[must_use]
    pub fn table_column_metadata(&self) -> Vec<&str> {
        self.columns.values().map(String::as_str).collect()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the rows to render.
    #[must_use]
    pub fn data_source(&self) -> &[ReportRow] {
        &self.data_source
    }

    /// Returns all renderer parameters.
    #[must_use]
    pub const fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// Returns a single renderer parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Returns a parameter as a string slice, if it is a string.
    #[must_use]
    pub fn parameter_str(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(Value::as_str)
    }

    /// Returns a parameter as an unsigned integer.
    ///
    /// Numeric strings such as `"12"` are accepted.
    #[must_use]
    pub fn parameter_u64(&self, name: &str) -> Option<u64> {
        match self.parameter(name)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Checks that this metadata can drive an export.
    ///
    /// An export needs at least one column.
    pub fn validate_for_export(&self) -> ReportsResult<()> {
        if self.columns.is_empty() {
            return Err(ReportsError::metadata(
                "at least one field to column mapping is required",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ReportMetadata`].
#[derive(Debug, Clone, Default)]
pub struct ReportMetadataBuilder {
    title: Option<String>,
    columns: Vec<(String, String)>,
    data_source: Vec<ReportRow>,
    parameters: IndexMap<String, Value>,
}

impl ReportMetadataBuilder {
    /// Sets the document title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets or clears the document title.
    #[must_use]
    pub fn maybe_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Appends a column mapping a field identifier to a label.
    #[must_use]
    pub fn column(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.columns.push((field.into(), label.into()));
        self
    }

    /// Appends several columns, in iteration order.
    #[must_use]
    pub fn columns<I, F, L>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (F, L)>,
        F: Into<String>,
        L: Into<String>,
    {
        self.columns
            .extend(columns.into_iter().map(|(f, l)| (f.into(), l.into())));
        self
    }

    /// Replaces the data source.
    #[must_use]
    pub fn data_source(mut self, rows: Vec<ReportRow>) -> Self {
        self.data_source = rows;
        self
    }

    /// Appends a single row to the data source.
    #[must_use]
    pub fn row(mut self, row: ReportRow) -> Self {
        self.data_source.push(row);
        self
    }

    /// Sets a renderer parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets several renderer parameters.
    #[must_use]
    pub fn parameters<I>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.parameters.extend(parameters);
        self
    }

    /// Builds the metadata.
    ///
    /// Fails when a field identifier is empty or repeated, or when a column
    /// label is empty.
    pub fn build(self) -> ReportsResult<ReportMetadata> {
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (field, label) in self.columns {
            if field.trim().is_empty() {
                return Err(ReportsError::metadata("field identifiers must not be empty"));
            }
            if label.trim().is_empty() {
                return Err(ReportsError::metadata_field(
                    format!("column label for '{field}' must not be empty"),
                    field,
                ));
            }
            if columns.contains_key(&field) {
                return Err(ReportsError::metadata_field(
                    format!("field '{field}' is mapped more than once"),
                    field,
                ));
            }
            columns.insert(field, label);
        }

        Ok(ReportMetadata {
            title: self.title.filter(|t| !t.trim().is_empty()),
            columns,
            data_source: self.data_source,
            parameters: self.parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn employees() -> ReportMetadata {
        ReportMetadata::builder()
            .title("Employees")
            .column("firstName", "First name")
            .column("lastName", "Last name")
            .build()
            .unwrap()
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let metadata = ReportMetadata::builder()
            .column("z", "Zed")
            .column("a", "Ay")
            .column("m", "Em")
            .build()
            .unwrap();

        assert_eq!(metadata.field_metadata(), vec!["z", "a", "m"]);
        assert_eq!(metadata.table_column_metadata(), vec!["Zed", "Ay", "Em"]);
        assert_eq!(metadata.column_count(), 3);
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let err = ReportMetadata::builder()
            .column("firstName", "First name")
            .column("firstName", "Given name")
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ReportsError::Metadata { field: Some(ref f), .. } if f == "firstName"
        ));
    }

    #[test]
    fn test_empty_field_or_label_is_rejected() {
        assert!(ReportMetadata::builder().column("", "Label").build().is_err());
        assert!(ReportMetadata::builder().column("field", "  ").build().is_err());
    }

    #[test]
    fn test_empty_mapping_builds_but_cannot_export() {
        let metadata = ReportMetadata::builder().title("Nothing").build().unwrap();
        assert_eq!(metadata.column_count(), 0);
        assert!(metadata.validate_for_export().is_err());
        assert!(employees().validate_for_export().is_ok());
    }

    #[test]
    fn test_blank_title_is_treated_as_missing() {
        let metadata = ReportMetadata::builder()
            .title("   ")
            .column("a", "A")
            .build()
            .unwrap();
        assert_eq!(metadata.title(), None);
        assert_eq!(metadata.title_or("Report"), "Report");
    }

    #[test]
    fn test_into_builder_attaches_data_source() {
        let metadata = employees();
        let rows = vec![
            ReportRow::new().with("firstName", "Sad").with("lastName", "Panda"),
            ReportRow::new().with("firstName", "Gigi").with("lastName", "Petrescu"),
        ];

        let populated = metadata.clone().into_builder().data_source(rows).build().unwrap();

        assert_eq!(populated.data_source().len(), 2);
        assert_eq!(populated.title(), metadata.title());
        assert_eq!(populated.field_metadata(), metadata.field_metadata());
        assert!(metadata.data_source().is_empty());
    }

    #[test]
    fn test_parameters() {
        let metadata = ReportMetadata::builder()
            .column("a", "A")
            .parameter("orientation", "landscape")
            .parameter("fontSize", json!(12))
            .parameter("rows", "40")
            .build()
            .unwrap();

        assert_eq!(metadata.parameter_str("orientation"), Some("landscape"));
        assert_eq!(metadata.parameter_u64("fontSize"), Some(12));
        assert_eq!(metadata.parameter_u64("rows"), Some(40));
        assert_eq!(metadata.parameter_u64("orientation"), None);
        assert_eq!(metadata.parameters().len(), 3);
    }

    #[test]
    fn test_row_cells_follow_requested_fields() {
        let row = ReportRow::new().with("b", 2).with("a", "one");
        let fields = ["a", "missing", "b"];
        let cells: Vec<String> = row.cells(&fields).map(display_value).collect();
        assert_eq!(cells, vec!["one", "", "2"]);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None), "");
        assert_eq!(display_value(Some(&Value::Null)), "");
        assert_eq!(display_value(Some(&json!("text"))), "text");
        assert_eq!(display_value(Some(&json!(true))), "true");
        assert_eq!(display_value(Some(&json!(1.5))), "1.5");
        assert_eq!(display_value(Some(&json!([1, 2]))), "[1,2]");
    }

    proptest! {
        #[test]
        fn prop_field_and_column_metadata_are_aligned(
            fields in proptest::collection::btree_set("[a-z]{1,8}", 1..16)
        ) {
            let columns: Vec<(String, String)> = fields
                .iter()
                .map(|f| (f.clone(), f.to_uppercase()))
                .collect();
            let metadata = ReportMetadata::builder()
                .columns(columns.clone())
                .build()
                .unwrap();

            let keys = metadata.field_metadata();
            let labels = metadata.table_column_metadata();
            prop_assert_eq!(keys.len(), labels.len());
            for (i, (field, label)) in columns.iter().enumerate() {
                prop_assert_eq!(keys[i], field.as_str());
                prop_assert_eq!(labels[i], label.as_str());
            }
        }
    }
}
