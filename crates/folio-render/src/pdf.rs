//! Tabular PDF output.
//!
//! Each page carries the report title, an optional subtitle, the column
//! header row and as many data rows as fit, followed by a page footer. Cell
//! text is clipped to its column. Text uses the standard Helvetica fonts with
//! WinAnsi encoding, so characters outside Latin-1 print as `?`.
//!
//! Parameters read from the report:
//!
//! | Name | Meaning |
//! |---|---|
//! | `orientation` | `portrait` or `landscape` |
//! | `fontSize` | body font size, clamped to 6..=24 |
//! | `subtitle` | line printed under the title |

use crate::{Orientation, RenderOptions, MAX_FONT_SIZE, MIN_FONT_SIZE};
use folio_core::metadata::display_value;
use folio_core::{ExportType, Renderer, ReportMetadata, ReportsError, ReportsResult};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::ops::Range;

const A4_SHORT: i64 = 595;
const A4_LONG: i64 = 842;
const MARGIN: i64 = 40;

/// Renders reports as paginated PDF tables.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    options: RenderOptions,
}

impl PdfRenderer {
    /// Creates a renderer with the given defaults.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn orientation(&self, metadata: &ReportMetadata) -> Orientation {
        metadata
            .parameter_str("orientation")
            .and_then(|o| o.parse().ok())
            .unwrap_or(self.options.orientation)
    }

    fn font_size(&self, metadata: &ReportMetadata) -> i64 {
        let requested = metadata
            .parameter_u64("fontSize")
            .and_then(|size| u16::try_from(size).ok())
            .unwrap_or(self.options.font_size);
        i64::from(requested.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
    }

    fn build(&self, metadata: &ReportMetadata) -> lopdf::Result<Vec<u8>> {
        let title = metadata.title_or(&self.options.default_title);
        let subtitle = metadata.parameter_str("subtitle");
        let layout = PageLayout::new(
            self.orientation(metadata),
            self.font_size(metadata),
            metadata.column_count(),
            subtitle.is_some(),
        );

        let fields = metadata.field_metadata();
        let labels = metadata.table_column_metadata();
        let rows = metadata.data_source();
        let pages = paginate(rows.len(), layout.rows_per_page);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let page_count = pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(page_count);
        for (index, range) in pages.into_iter().enumerate() {
            let mut ops = Vec::new();
            let mut y = layout.height - MARGIN - layout.title_size;
            text(&mut ops, "F2", layout.title_size, MARGIN, y, title);
            if let Some(subtitle) = subtitle {
                y -= layout.line_height;
                text(&mut ops, "F1", layout.font_size, MARGIN, y, subtitle);
            }

            y -= layout.title_size + layout.line_height / 2;
            for (i, label) in labels.iter().enumerate() {
                let cell = clip(label, layout.chars_per_column);
                text(&mut ops, "F2", layout.font_size, layout.column_x(i), y, &cell);
            }
            rule(&mut ops, y - layout.line_height / 3, layout.width);

            for row in &rows[range] {
                y -= layout.line_height;
                for (i, value) in row.cells(&fields).enumerate() {
                    let cell = clip(&display_value(value), layout.chars_per_column);
                    text(&mut ops, "F1", layout.font_size, layout.column_x(i), y, &cell);
                }
            }

            let footer = format!("Page {} of {}", index + 1, page_count);
            text(&mut ops, "F1", MIN_FONT_SIZE.into(), MARGIN, MARGIN / 2, &footer);

            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::try_from(page_count).unwrap_or(i64::MAX),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(layout.width),
                Object::Integer(layout.height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id: ObjectId = doc.add_object(dictionary! {
            "Title" => Object::String(latin1(title), StringFormat::Literal),
            "Producer" => Object::String(b"Folio".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        tracing::debug!(
            pages = page_count,
            rows = rows.len(),
            columns = fields.len(),
            bytes = out.len(),
            "PDF document rendered"
        );
        Ok(out)
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, metadata: &ReportMetadata, export_type: ExportType) -> ReportsResult<Vec<u8>> {
        if export_type != ExportType::Pdf {
            return Err(ReportsError::rendering(
                format!("PDF renderer cannot produce {export_type}"),
                export_type,
            ));
        }
        self.build(metadata).map_err(|e| {
            ReportsError::rendering(format!("failed to write PDF document: {e}"), export_type)
        })
    }

    fn supports(&self, export_type: ExportType) -> bool {
        export_type == ExportType::Pdf
    }
}

/// Page geometry, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageLayout {
    width: i64,
    height: i64,
    font_size: i64,
    title_size: i64,
    line_height: i64,
    column_width: i64,
    chars_per_column: usize,
    rows_per_page: usize,
}

impl PageLayout {
    fn new(orientation: Orientation, font_size: i64, columns: usize, subtitle: bool) -> Self {
        let (width, height) = match orientation {
            Orientation::Portrait => (A4_SHORT, A4_LONG),
            Orientation::Landscape => (A4_LONG, A4_SHORT),
        };
        let title_size = font_size + 6;
        let line_height = font_size * 3 / 2;
        let columns = i64::try_from(columns.max(1)).unwrap_or(i64::MAX);
        let column_width = (width - 2 * MARGIN) / columns;
        // Helvetica averages about half an em per glyph.
        let chars_per_column = usize::try_from((column_width * 2 / font_size - 1).max(1)).unwrap_or(1);

        let mut header_block = title_size + title_size + line_height / 2;
        if subtitle {
            header_block += line_height;
        }
        let body = height - 2 * MARGIN - header_block;
        let rows_per_page = usize::try_from((body / line_height).max(1)).unwrap_or(1);

        Self {
            width,
            height,
            font_size,
            title_size,
            line_height,
            column_width,
            chars_per_column,
            rows_per_page,
        }
    }

    fn column_x(&self, index: usize) -> i64 {
        MARGIN + i64::try_from(index).unwrap_or(0) * self.column_width
    }
}

/// Splits `rows` into page-sized ranges. There is always at least one page.
fn paginate(rows: usize, rows_per_page: usize) -> Vec<Range<usize>> {
    if rows == 0 {
        return vec![0..0];
    }
    let per_page = rows_per_page.max(1);
    (0..rows)
        .step_by(per_page)
        .map(|start| start..(start + per_page).min(rows))
        .collect()
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut clipped: String = text.chars().take(max - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Encodes text for a WinAnsi font.
/// WinAnsi bytes for printable ASCII and Latin-1. WinAnsi assigns other
/// glyphs to 0x80..=0x9F, so those and control characters become `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte @ (0x20..=0x7E | 0xA0..=0xFF)) => byte,
            _ => b'?',
        })
        .collect()
}

fn text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Integer(size)]));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(latin1(value), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn rule(ops: &mut Vec<Operation>, y: i64, page_width: i64) {
    ops.push(Operation::new("w", vec![Object::Integer(1)]));
    ops.push(Operation::new("m", vec![Object::Integer(MARGIN), Object::Integer(y)]));
    ops.push(Operation::new(
        "l",
        vec![Object::Integer(page_width - MARGIN), Object::Integer(y)],
    ));
    ops.push(Operation::new("S", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ReportRow;

    fn metadata(rows: usize) -> ReportMetadata {
        let mut builder = ReportMetadata::builder()
            .title("Employees")
            .column("firstName", "First name")
            .column("lastName", "Last name");
        for i in 0..rows {
            builder = builder.row(
                ReportRow::new()
                    .with("firstName", format!("First{i}"))
                    .with("lastName", format!("Last{i}")),
            );
        }
        builder.build().unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_renders_valid_pdf() {
        let bytes = PdfRenderer::default()
            .render(&metadata(2), ExportType::Pdf)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_empty_data_source_renders_single_page() {
        let bytes = PdfRenderer::default()
            .render(&metadata(0), ExportType::Pdf)
            .unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_long_reports_are_paginated() {
        let layout = PageLayout::new(Orientation::Portrait, 10, 2, false);
        let rows = layout.rows_per_page * 2 + 1;
        let bytes = PdfRenderer::default()
            .render(&metadata(rows), ExportType::Pdf)
            .unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn test_rejects_other_formats() {
        let renderer = PdfRenderer::default();
        assert!(!renderer.supports(ExportType::Xls));
        let err = renderer.render(&metadata(1), ExportType::Xls).unwrap_err();
        assert_eq!(err.error_code(), "RENDERING_ERROR");
    }

    #[test]
    fn test_landscape_fits_fewer_rows() {
        let portrait = PageLayout::new(Orientation::Portrait, 10, 3, false);
        let landscape = PageLayout::new(Orientation::Landscape, 10, 3, false);
        assert!(landscape.rows_per_page < portrait.rows_per_page);
        assert!(landscape.column_width > portrait.column_width);
    }

    #[test]
    fn test_subtitle_takes_a_line() {
        let plain = PageLayout::new(Orientation::Portrait, 10, 1, false);
        let with_subtitle = PageLayout::new(Orientation::Portrait, 10, 1, true);
        assert!(with_subtitle.rows_per_page < plain.rows_per_page);
    }

    #[test]
    fn test_font_size_parameter_is_clamped() {
        let renderer = PdfRenderer::default();
        let huge = metadata(0)
            .into_builder()
            .parameter("fontSize", 400)
            .build()
            .unwrap();
        assert_eq!(renderer.font_size(&huge), i64::from(MAX_FONT_SIZE));

        let tiny = metadata(0)
            .into_builder()
            .parameter("fontSize", "2")
            .build()
            .unwrap();
        assert_eq!(renderer.font_size(&tiny), i64::from(MIN_FONT_SIZE));
        assert_eq!(renderer.font_size(&metadata(0)), 10);
    }

    #[test]
    fn test_orientation_parameter_overrides_default() {
        let renderer = PdfRenderer::default();
        let landscape = metadata(0)
            .into_builder()
            .parameter("orientation", "landscape")
            .build()
            .unwrap();
        assert_eq!(renderer.orientation(&landscape), Orientation::Landscape);

        let unknown = metadata(0)
            .into_builder()
            .parameter("orientation", "diagonal")
            .build()
            .unwrap();
        assert_eq!(renderer.orientation(&unknown), Orientation::Portrait);
    }

    #[test]
    fn test_paginate() {
        assert_eq!(paginate(0, 10), vec![0..0]);
        assert_eq!(paginate(10, 10), vec![0..10]);
        assert_eq!(paginate(11, 10), vec![0..10, 10..11]);
        assert_eq!(paginate(3, 0), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("a rather long value", 8), "a rat...");
        assert_eq!(clip("abcdef", 2), "ab");
    }

    #[test]
    fn test_latin1_replaces_unencodable_characters() {
        assert_eq!(latin1("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(latin1("Ș"), vec![b'?']);
    }

    #[test]
    fn test_latin1_skips_winansi_remapped_range() {
        assert_eq!(latin1("a\u{80}b\u{92}c"), b"a?b?c".to_vec());
        assert_eq!(latin1("tab\there\u{7f}"), b"tab?here?".to_vec());
        assert_eq!(latin1("\u{a0}\u{ff}"), vec![0xA0, 0xFF]);
    }
}
