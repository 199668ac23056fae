//! Column configuration files.
//!
//! ```toml
//! [display]
//! precision = 2
//!
//! [[columns]]
//! key = "name"
//! label = "Company"
//!
//! [[columns]]
//! key = "revenue"
//! type = "formula"
//! formula = "{orders.total}"
//! ```

use crate::document::TableConfig;
use crate::error::Result;
use std::path::Path;

use super::read_limited;

/// Parse a column configuration from TOML text.
pub fn parse_config(content: &str) -> Result<TableConfig> {
    Ok(toml::from_str(content)?)
}

/// Load a column configuration file.
pub fn load_config(path: &Path) -> Result<TableConfig> {
    let content = read_limited(path)?;
    parse_config(&content)
}

/// Write a column configuration file.
pub fn write_config(path: &Path, config: &TableConfig) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ColumnDef, ColumnKind};
    use crate::error::CrmError;

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"
            [display]
            precision = 3

            [[columns]]
            key = "name"
            label = "Company"

            [[columns]]
            key = "revenue"
            type = "formula"
            formula = "{orders.total}"
            visible = false
            "#,
        )
        .unwrap();
        assert_eq!(config.display.precision, 3);
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[0].header(), "Company");
        assert_eq!(config.columns[0].kind, ColumnKind::Text);
        assert_eq!(config.columns[1].kind, ColumnKind::Formula);
        assert_eq!(config.columns[1].formula.as_deref(), Some("{orders.total}"));
        assert!(!config.columns[1].visible);
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.display.precision, 2);
        assert!(config.columns.is_empty());
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let err = parse_config("[[columns]]\nkey = \"a\"\nwidth = 10\n").unwrap_err();
        assert!(matches!(err, CrmError::Toml(_)));
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.toml");
        let config = TableConfig {
            columns: vec![
                ColumnDef::text("name"),
                ColumnDef::formula("total", "{price} * {qty}").with_label("Total"),
            ],
            ..TableConfig::default()
        };
        write_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
