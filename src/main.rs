//! crmformula - evaluate CRM formula columns from the command line

mod cli;
mod config;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use crmformula_core::storage::{load_config, load_rows, write_markdown, write_markdown_file};
use crmformula_core::{Table, TableConfig};
use crmformula_engine::builtins::FUNCTION_BUILTINS;
use crmformula_engine::engine::{FormulaOutput, Row, evaluate};
use serde_json::{Value, json};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.list_functions {
        for builtin in FUNCTION_BUILTINS {
            println!("{:<12} {}", builtin.name, builtin.description);
        }
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(formula) = &cli.command {
        return run_command(cli, formula);
    }
    if let Some(rows_path) = &cli.rows {
        return run_table(cli, rows_path);
    }
    Cli::command().print_help()?;
    Ok(ExitCode::from(2))
}

fn read_row(cli: &Cli) -> Result<Row> {
    let value: Value = if let Some(path) = &cli.row {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else if let Some(inline) = &cli.row_json {
        serde_json::from_str(inline).context("Invalid --row-json")?
    } else {
        return Ok(Row::new());
    };
    match value {
        Value::Object(row) => Ok(row),
        _ => bail!("Row must be a JSON object"),
    }
}

fn run_command(cli: &Cli, formula: &str) -> Result<ExitCode> {
    let row = read_row(cli)?;
    // Spreadsheet habit: `=1+2` means `1+2`.
    let formula = formula.strip_prefix('=').unwrap_or(formula);
    debug!(formula, fields = row.len(), "evaluating command formula");

    let Some(output) = evaluate(formula, &row) else {
        return Ok(ExitCode::SUCCESS);
    };

    if cli.json {
        let value = match &output {
            FormulaOutput::Value(v) => serde_json::to_value(v)?,
            FormulaOutput::Error(e) => json!({ "error": e.as_str() }),
        };
        println!("{}", value);
    } else {
        println!("{}", output);
    }

    Ok(if output.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn load_table_config(cli: &Cli) -> Result<Option<TableConfig>> {
    if let Some(path) = &cli.columns {
        let config = load_config(path)
            .with_context(|| format!("Failed to load columns from {}", path.display()))?;
        return Ok(Some(config));
    }
    if cli.no_default_columns {
        return Ok(None);
    }
    let Some(path) = config::default_columns_path().filter(|p| p.exists()) else {
        return Ok(None);
    };
    info!(path = %path.display(), "using default columns");
    let config = load_config(&path)
        .with_context(|| format!("Failed to load columns from {}", path.display()))?;
    Ok(Some(config))
}

fn run_table(cli: &Cli, rows_path: &Path) -> Result<ExitCode> {
    let rows = load_rows(rows_path)
        .with_context(|| format!("Failed to load rows from {}", rows_path.display()))?;
    let table = match load_table_config(cli)? {
        Some(config) => Table::new(config, rows)?,
        None => Table::from_rows(rows),
    };
    info!(
        rows = table.row_count(),
        columns = table.columns().len(),
        "rendering table"
    );

    // Each problem is logged as a warning; the affected cells show error tags.
    let problems = table.validate_formulas();
    if !problems.is_empty() {
        info!(count = problems.len(), "formula columns with errors");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&table.render())?);
    } else if let Some(output) = &cli.output {
        write_markdown_file(output, &table)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Exported to {}", output.display());
    } else {
        write_markdown(&mut std::io::stdout().lock(), &table)?;
    }
    Ok(ExitCode::SUCCESS)
}
