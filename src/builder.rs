//! Wallet table construction.
//!
//! Loads the record CSV and the ordered identifier list, then lays the records
//! out as a sheet: one header row followed by one row per identifier, in
//! identifier order. Identifiers without a record are skipped.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{
    data::{Value, parse_typed_value},
    derive::DerivedColumn,
    io_utils,
    metadata::{ColumnType, infer_column_types},
    workbook::{Sheet, Workbook},
};

pub const DEFAULT_KEY_COLUMN: &str = "ua";
pub const DEFAULT_RANK_COLUMN: &str = "wallet_number";
pub const DEFAULT_SHEET_NAME: &str = "Sheet";

/// Ordered, lowercased account identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierList {
    pub entries: Vec<String>,
}

impl IdentifierList {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_lowercase())
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let lines = io_utils::read_lines(path, encoding)
            .with_context(|| format!("Loading identifiers from {path:?}"))?;
        Ok(Self::from_lines(lines))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier to 1-based rank. A repeated identifier keeps the rank of its
    /// last occurrence.
    pub fn rank_map(&self) -> HashMap<&str, i64> {
        let mut ranks = HashMap::with_capacity(self.entries.len());
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Some(previous) = ranks.insert(entry.as_str(), idx as i64 + 1) {
                warn!(
                    "Identifier '{entry}' is listed more than once (ranks {previous} and {})",
                    idx + 1
                );
            }
        }
        ranks
    }
}

/// Loaded record CSV with per-column inferred types.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(anyhow!(
                    "Record {} has {} field(s) but the header has {}",
                    idx + 1,
                    row.len(),
                    headers.len()
                ));
            }
        }
        let types = infer_column_types(headers.len(), &rows);
        Ok(Self {
            headers,
            types,
            rows,
        })
    }

    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading headers from {path:?}"))?;
        let mut rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Reading records from {path:?}"))?
        {
            rows.push(io_utils::decode_record(&record, encoding)?);
        }
        let table = Self::from_rows(headers, rows)?;
        debug!(
            "Column types for {:?}: {}",
            path,
            table
                .headers
                .iter()
                .zip(&table.types)
                .map(|(name, ty)| format!("{name}:{ty}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(table)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn typed_row(&self, row: &[String]) -> Result<Vec<Value>> {
        row.iter()
            .zip(&self.types)
            .zip(&self.headers)
            .map(|((raw, ty), name)| {
                parse_typed_value(raw, ty).with_context(|| format!("Column '{name}'"))
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TableBuilder {
    pub key_column: String,
    pub rank_column: String,
    pub sheet_name: String,
    pub derived: Vec<DerivedColumn>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            rank_column: DEFAULT_RANK_COLUMN.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            derived: crate::derive::default_derived_columns(),
        }
    }
}

impl TableBuilder {
    pub fn headers(&self, records: &RecordTable) -> Vec<String> {
        std::iter::once(self.rank_column.clone())
            .chain(records.headers.iter().cloned())
            .chain(self.derived.iter().map(|column| column.name.clone()))
            .collect()
    }

    /// Builds the wallet sheet. Record keys are compared with the identifiers
    /// as-is; the first record carrying a key is used when keys repeat.
    pub fn build_sheet(&self, records: &RecordTable, identifiers: &IdentifierList) -> Result<Sheet> {
        let key_idx = records.column_index(&self.key_column).ok_or_else(|| {
            anyhow!(
                "Key column '{}' not found in record headers",
                self.key_column
            )
        })?;
        let ranks = identifiers.rank_map();

        let mut by_key: HashMap<&str, usize> = HashMap::with_capacity(records.rows.len());
        for (idx, row) in records.rows.iter().enumerate() {
            by_key.entry(row[key_idx].as_str()).or_insert(idx);
        }

        let mut sheet = Sheet::new(self.sheet_name.clone());
        sheet.push_values(self.headers(records).into_iter().map(Value::String));

        let mut skipped = 0usize;
        for identifier in &identifiers.entries {
            let Some(&record_idx) = by_key.get(identifier.as_str()) else {
                skipped += 1;
                continue;
            };
            let raw = &records.rows[record_idx];
            let rank = ranks.get(identifier.as_str()).copied().map_or(Value::Empty, Value::Integer);
            let mut values = Vec::with_capacity(raw.len() + self.derived.len() + 1);
            values.push(rank);
            values.extend(
                records
                    .typed_row(raw)
                    .with_context(|| format!("Typing record for '{identifier}'"))?,
            );
            for column in &self.derived {
                values.push(
                    column
                        .evaluate(&records.headers, raw)
                        .with_context(|| format!("Deriving '{}' for '{identifier}'", column.name))?,
                );
            }
            sheet.push_values(values);
        }

        if skipped > 0 {
            debug!("{skipped} identifier(s) had no matching record");
        }
        info!(
            "Placed {} of {} identifier(s) into sheet '{}'",
            sheet.row_count() - 1,
            identifiers.len(),
            sheet.name
        );
        Ok(sheet)
    }

    pub fn build(&self, records: &RecordTable, identifiers: &IdentifierList) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        workbook.push_sheet(self.build_sheet(records, identifiers)?);
        Ok(workbook)
    }
}
