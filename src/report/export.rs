//! Export renderers for traceability reports.
//!
//! Every renderer receives the same [`Report`] and emits the columns of
//! [`COLUMNS`](super::COLUMNS) in order: a PDF document, a one-sheet Excel
//! workbook, delimited text, and plain-text and JSON views for the terminal.

use super::{COLUMNS, Report};
use crate::{Error, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook};

const TITLE: &str = "Requirement Traceability Matrix (RTM)";

/// Turns a report into a downloadable document.
pub trait ReportRenderer {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    /// Binary documents cannot be printed to a terminal.
    fn is_binary(&self) -> bool {
        false
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>>;
}

/// Session, generation time and summary counts, one line each.
fn summary_lines(report: &Report) -> Vec<String> {
    let s = &report.summary;
    let mut lines = Vec::with_capacity(3);
    if let Some(session_id) = &report.session_id {
        lines.push(format!("Session: {}", session_id));
    }
    lines.push(format!(
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!(
        "Total: {} | Pass: {} ({:.1}%) | Failed: {} ({:.1}%) | Pending: {}",
        s.total, s.passed, s.pass_percent, s.failed, s.fail_percent, s.pending
    ));
    lines
}

fn export_error(format: &str, e: impl std::fmt::Display) -> Error {
    Error::Export(format!("{}: {}", format, e))
}

/// Comma-separated values, RFC 4180 quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    fn field(value: &str) -> String {
        if value.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn line<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
        cells
            .into_iter()
            .map(Self::field)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ReportRenderer for CsvRenderer {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let mut out = Self::line(COLUMNS);
        out.push('\n');
        for row in &report.rows {
            out.push_str(&Self::line(row.cells()));
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// The full report (summary and rows) as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(report)?)
    }
}

/// Aligned plain-text table with a summary header.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let mut lines = vec![TITLE.to_string()];
        lines.extend(summary_lines(report));
        lines.push(String::new());

        let mut widths = COLUMNS.map(|c| c.chars().count());
        for row in &report.rows {
            for (width, cell) in widths.iter_mut().zip(row.cells()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_line = |cells: [&str; 5]| {
            cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        lines.push(format_line(COLUMNS));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(rule.join("  "));
        lines.extend(report.rows.iter().map(|row| format_line(row.cells())));
        if report.rows.is_empty() {
            lines.push("(no matching items)".to_string());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out.into_bytes())
    }
}

/// A4 landscape PDF: title and summary, then the table, continued over as
/// many pages as the rows need.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    const PAGE_WIDTH: f32 = 297.0;
    const PAGE_HEIGHT: f32 = 210.0;
    const MARGIN: f32 = 15.0;
    const LINE_HEIGHT: f32 = 6.0;
    const COLUMN_X: [f32; 5] = [15.0, 55.0, 90.0, 215.0, 255.0];
    const ROWS_PER_PAGE: usize = 24;
    const DESCRIPTION_CHARS: usize = 65;
    const CELL_CHARS: usize = 22;

    fn clip(value: &str, max: usize) -> String {
        if value.chars().count() <= max {
            value.to_string()
        } else {
            let kept: String = value.chars().take(max.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }

    /// Table lines per page. Every page starts with the column header.
    pub fn table_pages(report: &Report) -> Vec<Vec<[String; 5]>> {
        let header = COLUMNS.map(str::to_string);
        let rows: Vec<[String; 5]> = report
            .rows
            .iter()
            .map(|row| {
                let cells = row.cells();
                std::array::from_fn(|i| {
                    let max = if i == 2 {
                        Self::DESCRIPTION_CHARS
                    } else {
                        Self::CELL_CHARS
                    };
                    Self::clip(cells[i], max)
                })
            })
            .collect();

        if rows.is_empty() {
            return vec![vec![header]];
        }
        rows.chunks(Self::ROWS_PER_PAGE)
            .map(|chunk| {
                let mut page = Vec::with_capacity(chunk.len() + 1);
                page.push(header.clone());
                page.extend_from_slice(chunk);
                page
            })
            .collect()
    }
}

impl ReportRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn is_binary(&self) -> bool {
        true
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let (width, height) = (Mm(Self::PAGE_WIDTH), Mm(Self::PAGE_HEIGHT));
        let (doc, page, layer) = PdfDocument::new(TITLE, width, height, "Report");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| export_error("pdf", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| export_error("pdf", e))?;

        let mut canvas = doc.get_page(page).get_layer(layer);
        let mut y = Self::PAGE_HEIGHT - Self::MARGIN;
        canvas.use_text(TITLE, 14.0, Mm(Self::MARGIN), Mm(y), &bold);
        for line in summary_lines(report) {
            y -= Self::LINE_HEIGHT;
            canvas.use_text(line, 10.0, Mm(Self::MARGIN), Mm(y), &regular);
        }
        y -= Self::LINE_HEIGHT;

        for (index, lines) in Self::table_pages(report).iter().enumerate() {
            if index > 0 {
                let (page, layer) = doc.add_page(width, height, "Report");
                canvas = doc.get_page(page).get_layer(layer);
                y = Self::PAGE_HEIGHT - Self::MARGIN;
            }
            for (line, cells) in lines.iter().enumerate() {
                y -= Self::LINE_HEIGHT;
                let font = if line == 0 { &bold } else { &regular };
                for (x, cell) in Self::COLUMN_X.iter().zip(cells) {
                    canvas.use_text(cell.as_str(), 9.0, Mm(*x), Mm(y), font);
                }
            }
        }

        doc.save_to_bytes().map_err(|e| export_error("pdf", e))
    }
}

/// Excel workbook with a single sheet: bold header row, one row per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxRenderer;

impl XlsxRenderer {
    pub const SHEET_NAME: &'static str = "QA Report";
}

impl ReportRenderer for XlsxRenderer {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn is_binary(&self) -> bool {
        true
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet
            .set_name(Self::SHEET_NAME)
            .map_err(|e| export_error("xlsx", e))?;
        for (col, title) in (0u16..).zip(COLUMNS) {
            sheet
                .write_string_with_format(0, col, title, &header)
                .map_err(|e| export_error("xlsx", e))?;
        }
        for (row_num, row) in (1u32..).zip(&report.rows) {
            for (col, cell) in (0u16..).zip(row.cells()) {
                sheet
                    .write_string(row_num, col, cell)
                    .map_err(|e| export_error("xlsx", e))?;
            }
        }
        sheet.autofit();

        workbook.save_to_buffer().map_err(|e| export_error("xlsx", e))
    }
}

/// Export formats the CLI can write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
    Pdf,
    Xlsx,
}

impl ExportFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(ExportFormat::Text),
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "pdf" => Some(ExportFormat::Pdf),
            "xlsx" | "excel" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self {
            ExportFormat::Text => Box::new(TextRenderer),
            ExportFormat::Csv => Box::new(CsvRenderer),
            ExportFormat::Json => Box::new(JsonRenderer),
            ExportFormat::Pdf => Box::new(PdfRenderer),
            ExportFormat::Xlsx => Box::new(XlsxRenderer),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("Unknown export format: {} (expected text, csv, json, pdf or xlsx)", s))
    }
}

/// `QA_Report_<session>.<ext>`, or `QA_Report.<ext>` without a session.
pub fn default_file_name(session_id: Option<&str>, renderer: &dyn ReportRenderer) -> String {
    match session_id {
        Some(id) => format!("QA_Report_{}.{}", id, renderer.extension()),
        None => format!("QA_Report.{}", renderer.extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistItem, ItemStatus};
    use crate::report::ReportFilter;

    fn report() -> Report {
        let items = vec![
            ChecklistItem {
                id: "C1".into(),
                text: "Add item, then \"checkout\"".into(),
                feature: "Cart".into(),
                status: ItemStatus::Failed,
                bug_id: Some("BUG-1".into()),
            },
            ChecklistItem {
                id: "L1".into(),
                text: "Valid credentials".into(),
                feature: "Login".into(),
                status: ItemStatus::Pass,
                bug_id: Some("OLD".into()),
            },
        ];
        Report::build(Some("abc123"), &items, &ReportFilter::default(), None)
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = String::from_utf8(CsvRenderer.render(&report()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Feature,Checklist ID,Description,Bug ID,Status");
        assert_eq!(
            lines[1],
            r#"Cart,C1,"Add item, then ""checkout""",BUG-1,Failed"#
        );
        assert_eq!(lines[2], "Login,L1,Valid credentials,-,Pass");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_text_table_contains_summary_and_rows() {
        let text = String::from_utf8(TextRenderer.render(&report()).unwrap()).unwrap();
        assert!(text.contains("Session: abc123"));
        assert!(text.contains("Total: 2 | Pass: 1 (50.0%) | Failed: 1 (50.0%) | Pending: 0"));
        assert!(text.contains("Checklist ID"));
        assert!(text.contains("BUG-1"));
        assert!(!text.contains("OLD"));
    }

    #[test]
    fn test_json_rows_use_export_columns() {
        let json = JsonRenderer.render(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["sessionId"], "abc123");
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["rows"][1]["bugId"], "-");
        assert_eq!(value["rows"][0]["description"], "Add item, then \"checkout\"");
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(Some("abc"), &CsvRenderer),
            "QA_Report_abc.csv"
        );
        assert_eq!(default_file_name(None, &JsonRenderer), "QA_Report.json");
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::Csv.renderer().content_type(), "text/csv");
        assert_eq!(
            default_file_name(Some("abc"), ExportFormat::Pdf.renderer().as_ref()),
            "QA_Report_abc.pdf"
        );
        assert_eq!(ExportFormat::parse("Excel"), Some(ExportFormat::Xlsx));
        assert!(ExportFormat::Xlsx.renderer().is_binary());
        assert!(!ExportFormat::Text.renderer().is_binary());
    }

    fn many_rows(count: usize) -> Report {
        let items: Vec<ChecklistItem> = (0..count)
            .map(|i| ChecklistItem {
                id: format!("ID-{:03}", i),
                text: "x".repeat(100),
                feature: "Bulk".into(),
                status: ItemStatus::Pending,
                bug_id: None,
            })
            .collect();
        Report::build(None, &items, &ReportFilter::default(), None)
    }

    #[test]
    fn test_pdf_pages_repeat_header_and_hold_every_row() {
        let report = many_rows(30);
        let pages = PdfRenderer::table_pages(&report);
        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert_eq!(page[0], COLUMNS.map(str::to_string));
        }
        let rows: usize = pages.iter().map(|page| page.len() - 1).sum();
        assert_eq!(rows, 30);
        assert_eq!(pages[1][6][1], "ID-029");
        assert!(pages[0][1][2].ends_with("..."));
        assert!(pages[0][1][2].chars().count() <= 65);
    }

    #[test]
    fn test_pdf_empty_report_has_header_only() {
        let pages = PdfRenderer::table_pages(&many_rows(0));
        assert_eq!(pages, vec![vec![COLUMNS.map(str::to_string)]]);
    }

    #[test]
    fn test_pdf_document_bytes() {
        let bytes = PdfRenderer.render(&report()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]).to_string();
        assert!(tail.contains("%%EOF"));
    }

    #[test]
    fn test_xlsx_single_sheet_with_header_and_rows() {
        use calamine::{Reader, Xlsx, open_workbook_from_rs};

        let bytes = XlsxRenderer.render(&report()).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![XlsxRenderer::SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(XlsxRenderer::SHEET_NAME).unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], COLUMNS.map(str::to_string));
        assert_eq!(rows[1], ["Cart", "C1", "Add item, then \"checkout\"", "BUG-1", "Failed"]);
        assert_eq!(rows[2][3], "-");
    }
}
