use crate::error::Result;
use crmformula_engine::engine::{
    FormulaError, FormulaOutput, Row, Scalar, check_formula, evaluate_opt, extract_tokens,
    format_output, normalize_quotes, resolve_path,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{ColumnDef, ColumnKind, Table};

/// Display strings for the visible part of a table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Compute a single cell. `None` means the cell is empty (no formula, or
    /// the field is absent from the row).
    pub fn cell(&self, row_index: usize, key: &str) -> Result<Option<FormulaOutput>> {
        let column = self.column(key)?;
        let row = self.row(row_index)?;
        Ok(compute_cell(column, row))
    }

    /// Compute a cell and format it for display.
    pub fn cell_display(&self, row_index: usize, key: &str) -> Result<String> {
        let column = self.column(key)?;
        let row = self.row(row_index)?;
        Ok(display_cell(
            column,
            compute_cell(column, row).as_ref(),
            self.config.display.precision,
        ))
    }

    /// Compute a column for every row.
    pub fn column_values(&self, key: &str) -> Result<Vec<Option<FormulaOutput>>> {
        let column = self.column(key)?;
        Ok(self.rows.iter().map(|row| compute_cell(column, row)).collect())
    }

    /// Field paths a column reads: the placeholders of a formula column, or
    /// the key itself for a plain column.
    pub fn dependencies(&self, key: &str) -> Result<Vec<String>> {
        let column = self.column(key)?;
        Ok(match column.kind {
            ColumnKind::Formula => column
                .formula
                .as_deref()
                .map(|f| extract_tokens(&normalize_quotes(f)))
                .unwrap_or_default(),
            ColumnKind::Text | ColumnKind::Number => vec![column.key.clone()],
        })
    }

    /// Formula columns that can never evaluate, whatever the row data.
    pub fn validate_formulas(&self) -> Vec<(String, FormulaError)> {
        let mut problems = Vec::new();
        for column in &self.config.columns {
            let Some(formula) = column.formula.as_deref() else {
                continue;
            };
            if column.kind != ColumnKind::Formula {
                continue;
            }
            if let Err(err) = check_formula(formula) {
                warn!(column = %column.key, formula, error = %err, "invalid formula column");
                problems.push((column.key.clone(), err));
            }
        }
        problems
    }

    /// Render headers and display strings for all visible columns.
    pub fn render(&self) -> RenderedTable {
        let precision = self.config.display.precision;
        let columns: Vec<&ColumnDef> = self.visible_columns().collect();
        let headers = columns.iter().map(|c| c.header().to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        display_cell(column, compute_cell(column, row).as_ref(), precision)
                    })
                    .collect()
            })
            .collect();
        RenderedTable { headers, rows }
    }
}

fn compute_cell(column: &ColumnDef, row: &Row) -> Option<FormulaOutput> {
    match column.kind {
        ColumnKind::Formula => evaluate_opt(column.formula.as_deref(), row),
        ColumnKind::Text | ColumnKind::Number => {
            field_value(row, &column.key).map(FormulaOutput::Value)
        }
    }
}

/// Resolve a plain column. A missing or null top-level field is an empty
/// cell rather than the `0` formulas see.
fn field_value(row: &Row, path: &str) -> Option<Scalar> {
    let first = path.split('.').next().unwrap_or(path);
    match row.get(first) {
        None | Some(Value::Null) => None,
        Some(_) => Some(resolve_path(row, path)),
    }
}

fn display_cell(column: &ColumnDef, output: Option<&FormulaOutput>, precision: usize) -> String {
    let Some(output) = output else {
        return String::new();
    };
    match (column.kind, output) {
        (ColumnKind::Text, FormulaOutput::Value(Scalar::Null)) => String::new(),
        (ColumnKind::Text, FormulaOutput::Value(Scalar::Number(n))) if n.is_nan() => String::new(),
        (ColumnKind::Text, FormulaOutput::Value(v)) => v.to_string(),
        _ => format_output(output, precision),
    }
}
