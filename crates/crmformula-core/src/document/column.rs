//! Column configuration for a table view.
//!
//! A column either shows a field of the row (`text`/`number`) or computes a
//! value from a formula (`formula`). Plain columns use their `key` as a
//! dotted path, so `customer.name` and one-to-many rollups like
//! `orders.total` work without writing a formula.

use serde::{Deserialize, Serialize};

/// How a column's cells are produced and displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Field value shown as-is.
    #[default]
    Text,
    /// Field value shown as a number rounded to the display precision.
    Number,
    /// Computed from `formula`.
    Formula,
}

/// A single column definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ColumnDef {
    pub fn text(key: &str) -> ColumnDef {
        ColumnDef {
            key: key.to_string(),
            label: None,
            kind: ColumnKind::Text,
            formula: None,
            visible: true,
        }
    }

    pub fn number(key: &str) -> ColumnDef {
        ColumnDef {
            kind: ColumnKind::Number,
            ..ColumnDef::text(key)
        }
    }

    pub fn formula(key: &str, formula: &str) -> ColumnDef {
        ColumnDef {
            kind: ColumnKind::Formula,
            formula: Some(formula.to_string()),
            ..ColumnDef::text(key)
        }
    }

    pub fn with_label(mut self, label: &str) -> ColumnDef {
        self.label = Some(label.to_string());
        self
    }

    pub fn hidden(mut self) -> ColumnDef {
        self.visible = false;
        self
    }

    /// Header text: the label, falling back to the key.
    pub fn header(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

/// Display settings shared by every column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Decimal places for non-integer numbers.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_precision() -> usize {
    2
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            precision: default_precision(),
        }
    }
}

/// Column configuration file contents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}
