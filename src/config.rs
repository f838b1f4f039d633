//! Scan configuration.
//!
//! Values come from an optional YAML file and are then overridden by whatever
//! the command line provides. Every field has a default so a partial file is
//! valid.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

pub const DEFAULT_THRESHOLD: usize = 4;
pub const DEFAULT_EXCLUDE_COLUMN: &str = "rs";
pub const DEFAULT_INBOUND_COLUMN: &str = "ibt";
pub const DEFAULT_BOUNDARY_COLUMN: &str = "lbt";
pub const DEFAULT_OUTPUT_SHEET: &str = "similarities";
pub const DEFAULT_ANCHOR_COLOR: &str = "ADD8E6";
pub const DEFAULT_MATCH_COLOR: &str = "90EE90";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source sheet; the first sheet of the workbook when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub exclude_column: String,
    pub inbound_column: String,
    pub boundary_column: String,
    pub threshold: usize,
    pub output_sheet: String,
    pub anchor_color: String,
    pub match_color: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            exclude_column: DEFAULT_EXCLUDE_COLUMN.to_string(),
            inbound_column: DEFAULT_INBOUND_COLUMN.to_string(),
            boundary_column: DEFAULT_BOUNDARY_COLUMN.to_string(),
            threshold: DEFAULT_THRESHOLD,
            output_sheet: DEFAULT_OUTPUT_SHEET.to_string(),
            anchor_color: DEFAULT_ANCHOR_COLOR.to_string(),
            match_color: DEFAULT_MATCH_COLOR.to_string(),
        }
    }
}

impl ScanConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading scan configuration from {path:?}"))?;
        let config = Self::from_yaml(&raw)
            .with_context(|| format!("Parsing scan configuration from {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    /// An empty document reads like an empty mapping, so every field keeps
    /// its default.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let value = match serde_yaml::from_str::<YamlValue>(raw)? {
            YamlValue::Null => YamlValue::Mapping(Default::default()),
            other => other,
        };
        Ok(serde_yaml::from_value(value)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Writing scan configuration to {path:?}"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(anyhow!("Match threshold must be at least 1"));
        }
        parse_rgb(&self.anchor_color)?;
        parse_rgb(&self.match_color)?;
        if self.output_sheet.trim().is_empty() {
            return Err(anyhow!("Output sheet name cannot be empty"));
        }
        Ok(())
    }

    pub fn anchor_rgb(&self) -> Result<u32> {
        parse_rgb(&self.anchor_color)
    }

    pub fn match_rgb(&self) -> Result<u32> {
        parse_rgb(&self.match_color)
    }
}

/// Parses `RRGGBB`, with or without a leading `#`.
pub fn parse_rgb(value: &str) -> Result<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(anyhow!("Color '{value}' must have six hex digits"));
    }
    u32::from_str_radix(hex, 16).with_context(|| format!("Color '{value}' is not valid hex"))
}
