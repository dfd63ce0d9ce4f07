//! Markdown rendering of individual fragments: text lines and tables.

use crate::pipeline::heading::HeadingLevel;
use crate::pipeline::table::Grid;

/// Render one text span as a heading or paragraph line.
///
/// The text is trimmed; headings get their `#` marker and a single space.
pub fn text_line(text: &str, level: HeadingLevel) -> String {
    let text = text.trim();
    match level.markdown_marker() {
        Some(marker) => format!("{marker} {text}"),
        None => text.to_string(),
    }
}

/// Normalise one raw cell: absent → empty, newlines → spaces, trimmed.
pub fn normalize_cell(cell: Option<&str>) -> String {
    match cell {
        Some(text) => text
            .replace("\r\n", " ")
            .replace(['\n', '\r'], " ")
            .trim()
            .to_string(),
        None => String::new(),
    }
}

/// Render a grid as GitHub-flavoured Markdown table lines.
///
/// Row 0 is the header and sets the separator width. Later rows keep their
/// own cell count, so ragged grids render ragged. An empty grid renders
/// nothing.
pub fn format_table(grid: &Grid) -> Vec<String> {
    let Some((header, body)) = grid.rows.split_first() else {
        return Vec::new();
    };

    let mut lines = Vec::with_capacity(grid.rows.len() + 1);
    lines.push(table_row(header));
    lines.push(separator_row(header.len()));
    lines.extend(body.iter().map(|row| table_row(row)));
    lines
}

/// Cell text is escaped so a literal `|` cannot split the cell.
fn table_row(cells: &[Option<String>]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .map(|c| normalize_cell(c.as_deref()).replace('|', "\\|"))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn separator_row(columns: usize) -> String {
    format!("| {} |", vec!["---"; columns].join(" | "))
}
