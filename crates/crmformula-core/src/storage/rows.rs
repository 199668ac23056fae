use crate::error::{CrmError, Result};
use crmformula_engine::engine::Row;
use serde_json::Value;
use std::path::Path;

use super::read_limited;

/// Parse row data: a JSON array whose elements are all objects.
pub fn parse_rows(content: &str) -> Result<Vec<Row>> {
    let Value::Array(items) = serde_json::from_str::<Value>(content)? else {
        return Err(CrmError::InvalidRows);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(CrmError::InvalidRow { index }),
        })
        .collect()
}

/// Load row data from a JSON file.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let content = read_limited(path)?;
    parse_rows(&content)
}
