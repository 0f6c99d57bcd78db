//! Output formatting module for Tally
//!
//! Provides table formatting for working-day age reports.

use tally_core::{FoldableRow, Report, ReportRow, Row, SUM_ROW_KEY};

/// Maximum width for the key column before truncation
const MAX_KEY_WIDTH: usize = 30;

/// Indentation of folded detail rows
const DETAIL_INDENT: &str = "  ";

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

/// One rendered table line
struct Line<'a> {
    label: String,
    cells: &'a [u64],
    total: u64,
}

impl<'a> Line<'a> {
    fn from_row<R: ReportRow>(row: &'a R, indent: &str) -> Self {
        Self {
            label: format!("{}{}", indent, truncate(row.key(), MAX_KEY_WIDTH)),
            cells: row.cells(),
            total: row.total_value(),
        }
    }
}

/// Format a report into an aligned table string.
///
/// Produces output in the format:
/// ```text
/// Workbasket  <= -11  -10 - -6  ...  >= 11  Total
/// ----------  ------  --------  ...  -----  -----
/// WB1              0         2  ...      1      3
/// ----------  ------  --------  ...  -----  -----
/// Total            0         2  ...      1      3
/// ```
///
/// # Arguments
///
/// * `report` - The report to render
/// * `key_label` - Title of the row key column
///
/// # Returns
///
/// A formatted string containing the table, or an empty result message if no
/// row was counted.
pub fn format_report_table(report: &Report<Row>, key_label: &str) -> String {
    if report.is_empty() {
        return "No tasks found.".to_string();
    }

    let lines: Vec<Line<'_>> = report.rows().map(|row| Line::from_row(row, "")).collect();
    render(report, key_label, &lines)
}

/// Format a detailed report, listing each row's folded detail rows indented
/// below it.
///
/// # Arguments
///
/// * `report` - The report to render
/// * `key_label` - Title of the row key column
pub fn format_detailed_report_table(report: &Report<FoldableRow>, key_label: &str) -> String {
    if report.is_empty() {
        return "No tasks found.".to_string();
    }

    let mut lines = Vec::new();
    for row in report.rows() {
        lines.push(Line::from_row(row, ""));
        lines.extend(
            row.foldable_rows()
                .map(|detail| Line::from_row(detail, DETAIL_INDENT)),
        );
    }
    render(report, key_label, &lines)
}

fn render<R: ReportRow>(report: &Report<R>, key_label: &str, lines: &[Line<'_>]) -> String {
    let sum_row = report.sum_row();
    let sum_line = Line {
        label: SUM_ROW_KEY.to_string(),
        cells: sum_row.cells(),
        total: sum_row.total_value(),
    };

    let mut headers: Vec<String> = report
        .column_headers()
        .iter()
        .map(|h| h.display_name())
        .collect();
    headers.push(SUM_ROW_KEY.to_string());

    let key_width = lines
        .iter()
        .chain(std::iter::once(&sum_line))
        .map(|l| l.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(key_label.chars().count());

    // Value columns are as wide as their header or their largest number
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            lines
                .iter()
                .chain(std::iter::once(&sum_line))
                .map(|l| line_value(l, i).to_string().len())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let mut output = String::new();

    output.push_str(&format!("{:<key_w$}", key_label, key_w = key_width));
    for (header, width) in headers.iter().zip(&widths) {
        output.push_str(&format!("  {:>w$}", header, w = width));
    }
    output.push('\n');

    let separator = separator_line(key_width, &widths);
    output.push_str(&separator);
    output.push('\n');

    for line in lines {
        push_line(&mut output, line, key_width, &widths);
    }

    output.push_str(&separator);
    output.push('\n');
    push_line(&mut output, &sum_line, key_width, &widths);

    // Remove trailing newline
    output.pop();

    output
}

/// Cell value at `index`, where the index past the last cell is the total
fn line_value(line: &Line<'_>, index: usize) -> u64 {
    line.cells.get(index).copied().unwrap_or(line.total)
}

fn separator_line(key_width: usize, widths: &[usize]) -> String {
    let mut line = format!("{:->key_w$}", "", key_w = key_width);
    for width in widths {
        line.push_str(&format!("  {:->w$}", "", w = width));
    }
    line
}

fn push_line(output: &mut String, line: &Line<'_>, key_width: usize, widths: &[usize]) {
    output.push_str(&format!("{:<key_w$}", line.label, key_w = key_width));
    for (i, width) in widths.iter().enumerate() {
        output.push_str(&format!("  {:>w$}", line_value(line, i), w = width));
    }
    output.push('\n');
}
