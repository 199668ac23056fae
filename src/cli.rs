//! Command-line arguments.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Evaluate CRM formula columns against row data.
///
/// Formulas reference row fields with `{field}` placeholders: dotted paths
/// walk nested objects (`{customer.address.city}`) and paths crossing an
/// array roll up every element (`{orders.total}`).
#[derive(Parser, Debug)]
#[command(name = "crmformula", version, about = "Evaluate CRM table formula columns")]
pub struct Cli {
    /// Evaluate a single formula and print the result.
    #[arg(short = 'c', long = "command", value_name = "FORMULA", conflicts_with = "rows")]
    pub command: Option<String>,

    /// Row for --command, as a file holding one JSON object.
    #[arg(long, value_name = "FILE", requires = "command", conflicts_with = "row_json")]
    pub row: Option<PathBuf>,

    /// Row for --command, as inline JSON.
    #[arg(long, value_name = "JSON", requires = "command")]
    pub row_json: Option<String>,

    /// Row data to render as a table (JSON array of objects).
    #[arg(long, value_name = "FILE")]
    pub rows: Option<PathBuf>,

    /// Column configuration (TOML). Defaults to columns.toml in the user config dir.
    #[arg(long, value_name = "FILE", requires = "rows")]
    pub columns: Option<PathBuf>,

    /// Ignore the user's default columns.toml.
    #[arg(long)]
    pub no_default_columns: bool,

    /// Write the table to a Markdown file instead of stdout.
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        requires = "rows",
        conflicts_with = "json"
    )]
    pub output: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// List the functions formulas can call.
    #[arg(long)]
    pub list_functions: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}
