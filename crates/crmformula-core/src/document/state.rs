use crate::error::{CrmError, Result};
use crmformula_engine::engine::Row;
use std::collections::HashSet;

use super::{ColumnDef, ColumnKind, TableConfig};

/// UI-agnostic table: column configuration plus the rows it is applied to.
#[derive(Clone, Debug, Default)]
pub struct Table {
    /// Column definitions and display settings
    pub config: TableConfig,
    /// Row data, owned by the table and only read during evaluation
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table, validating the column configuration.
    ///
    /// Column keys must be unique and every formula column needs a formula.
    pub fn new(config: TableConfig, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &config.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(CrmError::DuplicateColumn(column.key.clone()));
            }
            if !has_required_formula(column) {
                return Err(CrmError::MissingFormula(column.key.clone()));
            }
        }
        Ok(Table { config, rows })
    }

    /// Create a table whose columns are the top-level keys of the first row.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().map(|key| ColumnDef::text(key)).collect())
            .unwrap_or_default();
        Table {
            config: TableConfig {
                columns,
                ..TableConfig::default()
            },
            rows,
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.config.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.config.columns.iter().filter(|c| c.visible)
    }

    pub fn column(&self, key: &str) -> Result<&ColumnDef> {
        self.config
            .columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| CrmError::UnknownColumn(key.to_string()))
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(CrmError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Add a column, or replace the one with the same key.
    pub fn set_column(&mut self, column: ColumnDef) -> Result<()> {
        if !has_required_formula(&column) {
            return Err(CrmError::MissingFormula(column.key));
        }
        match self.config.columns.iter_mut().find(|c| c.key == column.key) {
            Some(existing) => *existing = column,
            None => self.config.columns.push(column),
        }
        Ok(())
    }

    /// Remove a column by key.
    pub fn remove_column(&mut self, key: &str) -> Result<ColumnDef> {
        let idx = self
            .config
            .columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| CrmError::UnknownColumn(key.to_string()))?;
        Ok(self.config.columns.remove(idx))
    }
}

fn has_required_formula(column: &ColumnDef) -> bool {
    column.kind != ColumnKind::Formula
        || column.formula.as_deref().is_some_and(|f| !f.trim().is_empty())
}
