//! Markdown export functionality

use crate::document::Table;
use std::io::Write;
use std::path::Path;

/// Write the visible columns of a table as a Markdown table.
pub fn write_markdown<W: Write>(w: &mut W, table: &Table) -> std::io::Result<()> {
    let rendered = table.render();

    if rendered.headers.is_empty() {
        writeln!(w, "*No columns*")?;
        return Ok(());
    }

    write!(w, "|")?;
    for header in &rendered.headers {
        write!(w, " {} |", escape_markdown(header))?;
    }
    writeln!(w)?;

    write!(w, "|")?;
    for _ in &rendered.headers {
        write!(w, "---|")?;
    }
    writeln!(w)?;

    for row in &rendered.rows {
        write!(w, "|")?;
        for cell in row {
            write!(w, " {} |", escape_markdown(cell))?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Write a table to a Markdown file.
pub fn write_markdown_file(path: &Path, table: &Table) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_markdown(&mut file, table)?;
    file.flush()
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
