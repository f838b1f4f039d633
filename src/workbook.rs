//! In-memory workbook model shared by the table builder, the similarity scan,
//! and the xlsx reader/writer.
//!
//! A [`Sheet`] is a list of rows of [`Cell`]s. Rows may have different lengths
//! only for blank delimiter rows; data rows of one sheet are expected to be as
//! wide as the header.

use crate::data::Value;

/// Background annotation of a cell in the similarity output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    None,
    Anchor,
    Match,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: Value,
    pub fill: Fill,
}

impl Cell {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            fill: Fill::None,
        }
    }

    pub fn with_fill(value: Value, fill: Fill) -> Self {
        Self { value, fill }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn push_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.rows.push(values.into_iter().map(Cell::new).collect());
    }

    pub fn push_blank(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header names taken from the first row.
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(|cell| cell.value.as_display()).collect())
            .unwrap_or_default()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.rows
            .first()?
            .iter()
            .position(|cell| cell.value.as_str() == Some(name))
    }
}

/// A row with no cells, or only empty cells, is a delimiter row.
pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(|cell| cell.value.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Returns `base` when free, otherwise `base1`, `base2`, ... so that an
    /// existing sheet is never replaced.
    pub fn unique_sheet_name(&self, base: &str) -> String {
        if self.sheet(base).is_none() {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| self.sheet(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Appends `sheet`, renaming it first if its name is already taken.
    pub fn push_sheet(&mut self, mut sheet: Sheet) -> &Sheet {
        sheet.name = self.unique_sheet_name(&sheet.name);
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        &self.sheets[last]
    }
}
