use anyhow::{Context, Result, anyhow};
use evalexpr::{
    ContextWithMutableVariables, HashMapContext, Value as EvalValue, eval_with_context,
};
use log::warn;

use crate::data::{Value, leading_number, normalize_column_name};

pub const DEFAULT_DERIVES: &[&str] = &["atad=dwm/lzd", "average=amt/tc"];

#[derive(Debug, Clone)]
pub struct DerivedColumn {
    pub name: String,
    pub expression: String,
}

impl DerivedColumn {
    pub fn parse(definition: &str) -> Result<Self> {
        let mut parts = definition.splitn(2, '=');
        let name = parts
            .next()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("Derived column is missing a name"))?;
        let expression = parts
            .next()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("Derived column '{name}' is missing an expression"))?;
        Ok(DerivedColumn {
            name: name.to_string(),
            expression: expression.to_string(),
        })
    }

    /// Evaluates the expression against one raw record. Columns are bound by
    /// normalized name and by `c{index}`; numeric-looking cells are bound as
    /// floats so `/` is true division.
    pub fn evaluate(&self, headers: &[String], raw_row: &[String]) -> Result<Value> {
        let mut context: HashMapContext = HashMapContext::new();
        for (idx, header) in headers.iter().enumerate() {
            let raw = raw_row.get(idx).map(String::as_str).unwrap_or("");
            let bound = if raw.is_empty() {
                EvalValue::Empty
            } else if let Some(number) = leading_number(raw) {
                EvalValue::Float(number)
            } else {
                EvalValue::String(raw.to_string())
            };
            context
                .set_value(normalize_column_name(header).into(), bound.clone())
                .with_context(|| format!("Binding column '{header}'"))?;
            context
                .set_value(format!("c{idx}").into(), bound)
                .with_context(|| format!("Binding column index {idx}"))?;
        }

        let result = eval_with_context(&self.expression, &context)
            .with_context(|| format!("Evaluating expression for column '{}'", self.name))?;
        Ok(match result {
            EvalValue::Float(f) if f.is_finite() => Value::Float(f),
            EvalValue::Float(f) => {
                warn!(
                    "Derived column '{}' produced {f}; leaving the cell empty",
                    self.name
                );
                Value::Empty
            }
            EvalValue::Int(i) => Value::Integer(i),
            EvalValue::String(s) => Value::String(s),
            EvalValue::Boolean(b) => Value::Boolean(b),
            EvalValue::Tuple(values) => Value::String(
                values
                    .into_iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
            EvalValue::Empty => Value::Empty,
        })
    }
}

pub fn parse_derived_columns(definitions: &[String]) -> Result<Vec<DerivedColumn>> {
    definitions
        .iter()
        .map(|definition| DerivedColumn::parse(definition))
        .collect()
}

/// The two ratio columns of the wallet report.
pub fn default_derived_columns() -> Vec<DerivedColumn> {
    DEFAULT_DERIVES
        .iter()
        .filter_map(|definition| DerivedColumn::parse(definition).ok())
        .collect()
}
