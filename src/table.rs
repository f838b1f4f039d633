//! Plain-text rendering of a similarity sheet.
//!
//! Anchor rows are tagged `anchor` in a leading column; match-filled cells of
//! member rows are prefixed with `*`. Blank delimiter rows print as empty lines.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::workbook::{Cell, Fill, is_blank_row};

const MATCH_MARKER: char = '*';

pub fn render_sheet(columns: &[String], rows: &[Vec<Cell>]) -> String {
    let headers = std::iter::once("role".to_string())
        .chain(columns.iter().cloned())
        .collect::<Vec<_>>();
    let rendered_rows = rows
        .iter()
        .map(|row| {
            if is_blank_row(row) {
                return None;
            }
            let role = if row.iter().all(|cell| cell.fill == Fill::Anchor) {
                "anchor"
            } else {
                ""
            };
            let cells = std::iter::once(role.to_string())
                .chain(row.iter().map(render_cell))
                .collect::<Vec<_>>();
            Some(cells)
        })
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for cells in rendered_rows.iter().flatten() {
        for (idx, cell) in cells.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for cells in &rendered_rows {
        match cells {
            Some(cells) => {
                let _ = writeln!(output, "{}", format_row(cells, &widths));
            }
            None => output.push('\n'),
        }
    }
    output
}

pub fn print_sheet(columns: &[String], rows: &[Vec<Cell>]) {
    print!("{}", render_sheet(columns, rows));
}

fn render_cell(cell: &Cell) -> String {
    let text = cell.value.as_display();
    if cell.fill == Fill::Match {
        format!("{MATCH_MARKER}{text}")
    } else {
        text
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(sanitized.as_ref()));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    #[test]
    fn marks_anchor_rows_and_matched_cells() {
        let columns = vec!["ua".to_string(), "n".to_string()];
        let rows = vec![
            vec![
                Cell::with_fill(Value::from("a"), Fill::Anchor),
                Cell::with_fill(Value::Integer(1), Fill::Anchor),
            ],
            vec![
                Cell::new(Value::from("b")),
                Cell::with_fill(Value::Integer(1), Fill::Match),
            ],
            Vec::new(),
        ];
        let rendered = render_sheet(&columns, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec!["role    ua  n", "------  ---  ---", "anchor  a   1", "        b   *1", ""]
        );
    }

    #[test]
    fn control_characters_are_flattened() {
        let columns = vec!["note".to_string()];
        let rows = vec![vec![Cell::with_fill(
            Value::from("line1\nline2"),
            Fill::Anchor,
        )]];
        let rendered = render_sheet(&columns, &rows);
        assert_eq!(rendered.lines().nth(2), Some("anchor  line1 line2"));
    }
}
