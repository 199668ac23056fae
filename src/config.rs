use directories::ProjectDirs;
use std::path::PathBuf;

const COLUMNS_FILE: &str = "columns.toml";

/// `<config dir>/crmformula/columns.toml`, if a home directory is known.
pub fn default_columns_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "crmformula")?;
    Some(proj.config_dir().join(COLUMNS_FILE))
}
