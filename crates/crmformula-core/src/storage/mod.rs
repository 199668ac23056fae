//! Storage for column configuration (TOML), row data (JSON) and Markdown export

mod config;
mod md;
mod rows;

pub use config::{load_config, parse_config, write_config};
pub use md::{write_markdown, write_markdown_file};
pub use rows::{load_rows, parse_rows};

use crate::error::Result;
use std::path::Path;

const MAX_INPUT_FILE_BYTES: u64 = 16 * 1_048_576; // 16 MiB

fn read_limited(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_INPUT_FILE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_INPUT_FILE_BYTES
            ),
        )
        .into());
    }
    Ok(std::fs::read_to_string(path)?)
}
