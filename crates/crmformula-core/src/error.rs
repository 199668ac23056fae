//! Error types for crmformula core.

use thiserror::Error;

/// Errors that can occur while loading or querying a table
#[derive(Error, Debug)]
pub enum CrmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid row data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid column configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to write column configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Row data must be a JSON array of objects")]
    InvalidRows,

    #[error("Row {index} is not an object")]
    InvalidRow { index: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate column key: {0}")]
    DuplicateColumn(String),

    #[error("Formula column '{0}' has no formula")]
    MissingFormula(String),

    #[error("Row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, CrmError>;
