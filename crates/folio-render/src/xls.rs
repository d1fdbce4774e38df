//! Excel 2003 XML spreadsheet output.
//!
//! The workbook holds one worksheet: a bold header row of column labels
//! followed by one row per record. Numbers become `Number` cells, booleans
//! `Boolean` cells and everything else `String` cells. The worksheet name
//! comes from the `sheetName` parameter, falling back to the title.

use crate::RenderOptions;
use folio_core::{ExportType, Renderer, ReportMetadata, ReportsError, ReportsResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Cursor;

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const MAX_SHEET_NAME: usize = 31;
const COLUMN_WIDTH: &str = "120";

/// Renders reports as SpreadsheetML workbooks.
#[derive(Debug, Clone, Default)]
pub struct XlsRenderer {
    options: RenderOptions,
}

impl XlsRenderer {
    /// Creates a renderer with the given defaults.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn build(&self, metadata: &ReportMetadata) -> Result<Vec<u8>, String> {
        let title = metadata.title_or(&self.options.default_title);
        let sheet = sheet_name(metadata.parameter_str("sheetName").unwrap_or(title));
        let fields = metadata.field_metadata();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        emit(
            &mut w,
            Event::PI(BytesPI::new(r#"mso-application progid="Excel.Sheet""#)),
        )?;
        emit(
            &mut w,
            Event::Start(
                BytesStart::new("Workbook")
                    .with_attributes([("xmlns", SPREADSHEET_NS), ("xmlns:ss", SPREADSHEET_NS)]),
            ),
        )?;

        emit(&mut w, Event::Start(BytesStart::new("DocumentProperties").with_attributes([(
            "xmlns",
            "urn:schemas-microsoft-com:office:office",
        )])))?;
        element(&mut w, "Title", title)?;
        emit(&mut w, Event::End(BytesEnd::new("DocumentProperties")))?;

        emit(&mut w, Event::Start(BytesStart::new("Styles")))?;
        emit(
            &mut w,
            Event::Start(BytesStart::new("Style").with_attributes([("ss:ID", "header")])),
        )?;
        emit(
            &mut w,
            Event::Empty(BytesStart::new("Font").with_attributes([("ss:Bold", "1")])),
        )?;
        emit(&mut w, Event::End(BytesEnd::new("Style")))?;
        emit(&mut w, Event::End(BytesEnd::new("Styles")))?;

        emit(
            &mut w,
            Event::Start(BytesStart::new("Worksheet").with_attributes([("ss:Name", sheet.as_str())])),
        )?;
        emit(&mut w, Event::Start(BytesStart::new("Table")))?;
        for _ in &fields {
            emit(
                &mut w,
                Event::Empty(BytesStart::new("Column").with_attributes([("ss:Width", COLUMN_WIDTH)])),
            )?;
        }

        emit(&mut w, Event::Start(BytesStart::new("Row")))?;
        for label in metadata.table_column_metadata() {
            cell(&mut w, Some("header"), "String", label)?;
        }
        emit(&mut w, Event::End(BytesEnd::new("Row")))?;

        for row in metadata.data_source() {
            emit(&mut w, Event::Start(BytesStart::new("Row")))?;
            for value in row.cells(&fields) {
                match value {
                    None | Some(Value::Null) => emit(&mut w, Event::Empty(BytesStart::new("Cell")))?,
                    Some(Value::Number(n)) => cell(&mut w, None, "Number", &n.to_string())?,
                    Some(Value::Bool(b)) => cell(&mut w, None, "Boolean", if *b { "1" } else { "0" })?,
                    Some(Value::String(s)) => cell(&mut w, None, "String", s)?,
                    Some(other) => cell(&mut w, None, "String", &other.to_string())?,
                }
            }
            emit(&mut w, Event::End(BytesEnd::new("Row")))?;
        }

        emit(&mut w, Event::End(BytesEnd::new("Table")))?;
        emit(&mut w, Event::End(BytesEnd::new("Worksheet")))?;
        emit(&mut w, Event::End(BytesEnd::new("Workbook")))?;

        Ok(w.into_inner().into_inner())
    }
}

impl Renderer for XlsRenderer {
    fn render(&self, metadata: &ReportMetadata, export_type: ExportType) -> ReportsResult<Vec<u8>> {
        if export_type != ExportType::Xls {
            return Err(ReportsError::rendering(
                format!("spreadsheet renderer cannot produce {export_type}"),
                export_type,
            ));
        }
        self.build(metadata).map_err(|e| {
            ReportsError::rendering(format!("failed to write spreadsheet: {e}"), export_type)
        })
    }

    fn supports(&self, export_type: ExportType) -> bool {
        export_type == ExportType::Xls
    }
}

fn emit(w: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), String> {
    w.write_event(event).map_err(|e| e.to_string())
}

fn element(w: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<(), String> {
    emit(w, Event::Start(BytesStart::new(name)))?;
    emit(w, Event::Text(BytesText::new(&sanitize_xml(text))))?;
    emit(w, Event::End(BytesEnd::new(name)))
}

fn cell(
    w: &mut Writer<Cursor<Vec<u8>>>,
    style: Option<&str>,
    kind: &str,
    text: &str,
) -> Result<(), String> {
    let mut start = BytesStart::new("Cell");
    if let Some(style) = style {
        start.push_attribute(("ss:StyleID", style));
    }
    emit(w, Event::Start(start))?;
    emit(
        w,
        Event::Start(BytesStart::new("Data").with_attributes([("ss:Type", kind)])),
    )?;
    emit(w, Event::Text(BytesText::new(&sanitize_xml(text))))?;
    emit(w, Event::End(BytesEnd::new("Data")))?;
    emit(w, Event::End(BytesEnd::new("Cell")))
}

/// Replaces characters XML 1.0 does not allow, which escaping cannot
/// represent, with U+FFFD.
fn sanitize_xml(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Worksheet names are at most 31 characters and may not contain `[]:*?/\`
/// or control characters.
fn sheet_name(requested: &str) -> String {
    let cleaned: String = requested
        .chars()
        .filter(|c| is_xml_char(*c) && !c.is_control())
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ReportRow;
    use serde_json::json;

    fn render(metadata: &ReportMetadata) -> String {
        let bytes = XlsRenderer::default()
            .render(metadata, ExportType::Xls)
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    fn employees() -> ReportMetadata {
        ReportMetadata::builder()
            .title("Employees")
            .column("firstName", "First name")
            .column("age", "Age")
            .column("active", "Active")
            .row(
                ReportRow::new()
                    .with("firstName", "Sad")
                    .with("age", 33)
                    .with("active", true),
            )
            .row(ReportRow::new().with("firstName", "Gigi & Co"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_row_uses_column_labels() {
        let xml = render(&employees());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            r#"<Cell ss:StyleID="header"><Data ss:Type="String">First name</Data></Cell>"#
        ));
        assert!(xml.contains(r#"<Worksheet ss:Name="Employees">"#));
    }

    #[test]
    fn test_cells_are_typed() {
        let xml = render(&employees());
        assert!(xml.contains(r#"<Data ss:Type="Number">33</Data>"#));
        assert!(xml.contains(r#"<Data ss:Type="Boolean">1</Data>"#));
        assert!(xml.contains(r#"<Data ss:Type="String">Sad</Data>"#));
    }

    #[test]
    fn test_text_is_escaped_and_missing_cells_are_empty() {
        let xml = render(&employees());
        assert!(xml.contains("Gigi &amp; Co"));
        assert!(xml.contains("<Cell/>"));
    }

    #[test]
    fn test_empty_data_source_renders_header_only() {
        let metadata = ReportMetadata::builder()
            .column("firstName", "First name")
            .build()
            .unwrap();
        let xml = render(&metadata);
        assert_eq!(xml.matches("<Row>").count(), 1);
        assert!(xml.contains(r#"<Worksheet ss:Name="Report">"#));
    }

    #[test]
    fn test_sheet_name_parameter() {
        let metadata = employees()
            .into_builder()
            .parameter("sheetName", json!("Q3: staff/contractors [draft] overview"))
            .build()
            .unwrap();
        let xml = render(&metadata);
        assert!(xml.contains(r#"<Worksheet ss:Name="Q3 staffcontractors draft overv">"#));
    }

    #[test]
    fn test_sheet_name_sanitising() {
        assert_eq!(sheet_name("***"), "Sheet1");
        assert_eq!(sheet_name("Sales"), "Sales");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME);
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let metadata = ReportMetadata::builder()
            .title("Logs\u{7}")
            .column("message", "Message")
            .row(ReportRow::new().with("message", "line\u{0}break\u{1b}[0m"))
            .parameter("sheetName", json!("Tab\u{1}le"))
            .build()
            .unwrap();

        let bytes = XlsRenderer::default()
            .render(&metadata, ExportType::Xls)
            .unwrap();
        let illegal: Vec<u8> = bytes
            .iter()
            .copied()
            .filter(|b| *b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
            .collect();
        assert!(illegal.is_empty(), "illegal bytes: {illegal:?}");

        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("line\u{FFFD}break\u{FFFD}[0m"));
        assert!(xml.contains("<Title>Logs\u{FFFD}</Title>"));
        assert!(xml.contains(r#"<Worksheet ss:Name="Table">"#));
    }

    #[test]
    fn test_sanitize_borrows_clean_text() {
        assert!(matches!(sanitize_xml("Sad Panda\t\r\n"), Cow::Borrowed(_)));
        assert_eq!(sanitize_xml("a\u{b}b\u{FFFF}"), "a\u{FFFD}b\u{FFFD}");
    }

    #[test]
    fn test_rejects_other_formats() {
        let renderer = XlsRenderer::default();
        assert!(!renderer.supports(ExportType::Pdf));
        assert!(renderer.render(&employees(), ExportType::Pdf).is_err());
    }
}
