//! Workbook persistence.
//!
//! Reading goes through calamine and keeps cell values only. Writing goes
//! through rust_xlsxwriter and renders [`Fill`] as solid background colors.
//! Blank delimiter rows are written as rows without cells.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use log::{debug, info};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook as XlsxWorkbook, XlsxError};

use crate::{
    data::Value,
    workbook::{Cell, Fill, Sheet, Workbook},
};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Background colors for the two highlighted fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillColors {
    pub anchor: u32,
    pub matched: u32,
}

impl Default for FillColors {
    fn default() -> Self {
        Self {
            anchor: 0xADD8E6,
            matched: 0x90EE90,
        }
    }
}

fn xlsx_err(err: XlsxError) -> anyhow::Error {
    anyhow!("xlsx write error: {err}")
}

fn solid_fill(rgb: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(rgb))
        .set_pattern(FormatPattern::Solid)
}

/// Loads every sheet of `path`. Leading empty rows come back as blank rows and
/// leading empty columns as empty cells, so cell positions survive a round trip.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let mut source =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let mut workbook = Workbook::new();
    for name in source.sheet_names() {
        let range = source
            .worksheet_range(&name)
            .with_context(|| format!("Reading sheet '{name}' from {path:?}"))?;
        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(row, col)| (row as usize, col as usize));
        let mut sheet = Sheet::new(name.clone());
        for _ in 0..row_offset {
            sheet.push_blank();
        }
        for row in range.rows() {
            let cells = std::iter::repeat_n(Value::Empty, col_offset)
                .chain(row.iter().map(data_to_value))
                .map(Cell::new)
                .collect();
            sheet.push_row(cells);
        }
        debug!("Loaded sheet '{}' with {} row(s)", name, sheet.row_count());
        workbook.sheets.push(sheet);
    }
    info!(
        "Loaded {} sheet(s) from {:?}",
        workbook.sheets.len(),
        path
    );
    Ok(workbook)
}

/// Spreadsheet numbers come back as floats; integral ones are folded to
/// integers so they compare equal to what the table builder wrote.
pub fn data_to_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Empty,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::Integer(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Boolean(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => Value::String(format_datetime(&parsed)),
            None => Value::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(err) => Value::String(err.to_string()),
    }
}

fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn save_workbook(path: &Path, workbook: &Workbook, colors: FillColors) -> Result<()> {
    let anchor_format = solid_fill(colors.anchor);
    let match_format = solid_fill(colors.matched);
    let mut out = XlsxWorkbook::new();

    for sheet in &workbook.sheets {
        let worksheet = out.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(xlsx_err)?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx)
                .with_context(|| format!("Sheet '{}' has too many rows", sheet.name))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx)
                    .with_context(|| format!("Sheet '{}' has too many columns", sheet.name))?;
                let format = match cell.fill {
                    Fill::None => None,
                    Fill::Anchor => Some(&anchor_format),
                    Fill::Match => Some(&match_format),
                };
                match (&cell.value, format) {
                    (Value::Empty, None) => {}
                    (Value::Empty, Some(format)) => {
                        worksheet.write_blank(row_num, col_num, format).map_err(xlsx_err)?;
                    }
                    (Value::String(s), None) => {
                        worksheet.write_string(row_num, col_num, s).map_err(xlsx_err)?;
                    }
                    (Value::String(s), Some(format)) => {
                        worksheet
                            .write_string_with_format(row_num, col_num, s, format)
                            .map_err(xlsx_err)?;
                    }
                    (Value::Integer(i), None) => {
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(xlsx_err)?;
                    }
                    (Value::Integer(i), Some(format)) => {
                        worksheet
                            .write_number_with_format(row_num, col_num, *i as f64, format)
                            .map_err(xlsx_err)?;
                    }
                    (Value::Float(f), None) => {
                        worksheet.write_number(row_num, col_num, *f).map_err(xlsx_err)?;
                    }
                    (Value::Float(f), Some(format)) => {
                        worksheet
                            .write_number_with_format(row_num, col_num, *f, format)
                            .map_err(xlsx_err)?;
                    }
                    (Value::Boolean(b), None) => {
                        worksheet.write_boolean(row_num, col_num, *b).map_err(xlsx_err)?;
                    }
                    (Value::Boolean(b), Some(format)) => {
                        worksheet
                            .write_boolean_with_format(row_num, col_num, *b, format)
                            .map_err(xlsx_err)?;
                    }
                }
            }
        }
    }

    out.save(path)
        .map_err(xlsx_err)
        .with_context(|| format!("Saving workbook to {path:?}"))?;
    info!(
        "Wrote {} sheet(s) to {:?}",
        workbook.sheets.len(),
        path
    );
    Ok(())
}
