//! Column type inference for loaded record tables.
//!
//! Every non-empty value in a column must agree on a type for that type to be
//! chosen; the first surviving candidate in the order boolean, integer, float
//! wins and anything else falls back to string.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_integer: bool,
    possible_float: bool,
    possible_boolean: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_integer: true,
            possible_float: true,
            possible_boolean: true,
        }
    }

    fn observe(&mut self, value: &str) {
        if self.possible_boolean && !matches!(value.to_ascii_lowercase().as_str(), "true" | "false")
        {
            self.possible_boolean = false;
        }
        if self.possible_integer && value.parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && value.parse::<f64>().is_err() {
            self.possible_float = false;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.possible_boolean {
            ColumnType::Boolean
        } else if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_float {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

/// Infers one [`ColumnType`] per column. A column with no non-empty values is a
/// string column.
pub fn infer_column_types(column_count: usize, rows: &[Vec<String>]) -> Vec<ColumnType> {
    let mut candidates = vec![TypeCandidate::new(); column_count];
    let mut seen = vec![false; column_count];
    for row in rows {
        for (idx, field) in row.iter().enumerate().take(column_count) {
            if field.is_empty() {
                continue;
            }
            seen[idx] = true;
            candidates[idx].observe(field);
        }
    }
    candidates
        .iter()
        .zip(seen)
        .map(|(candidate, seen)| {
            if seen {
                candidate.decide()
            } else {
                ColumnType::String
            }
        })
        .collect()
}
