//! Integration tests for command mode (-c/--command) and table rendering (--rows)

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn crmformula() -> Command {
    let mut cmd = Command::cargo_bin("crmformula").expect("binary is built");
    // Tests must be deterministic and not depend on a user's columns.toml.
    cmd.arg("--no-default-columns");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = crmformula().args(args).output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_formula_with_inline_row() {
    let (stdout, _, code) = run_command(&[
        "-c",
        "{price} * {qty}",
        "--row-json",
        r#"{"price": 2.5, "qty": "4"}"#,
    ]);
    assert_eq!(stdout.trim(), "10");
    assert_eq!(code, 0);
}

#[test]
fn test_one_to_many_rollup() {
    let row = write_temp(
        r#"{"orders": [{"name": "A", "total": 10}, {"name": "B", "total": 15}]}"#,
        ".json",
    );
    let path = row.path().to_str().expect("utf-8 path");

    let (stdout, _, code) = run_command(&["-c", "{orders.total}", "--row", path]);
    assert_eq!(stdout.trim(), "25");
    assert_eq!(code, 0);

    let (stdout, _, _) = run_command(&["-c", "{orders.name}", "--row", path]);
    assert_eq!(stdout.trim(), "A, B");
}

#[test]
fn test_auto_strip_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_error_exit_code() {
    let (stdout, _, code) = run_command(&["-c", "undefined_function()"]);
    assert_eq!(stdout.trim(), "#ERR: Syntax");
    assert_eq!(code, 1);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert_eq!(stdout.trim(), "#ERR: Infinity");
    assert_eq!(code, 1);
}

#[test]
fn test_unsafe_expression() {
    let (stdout, _, code) = run_command(&["-c", "{a} window", "--row-json", r#"{"a": 1}"#]);
    assert_eq!(stdout.trim(), "#ERR: Unsafe Expression");
    assert_eq!(code, 1);
}

#[test]
fn test_json_output() {
    crmformula()
        .args(["-c", "{name} + '!'", "--row-json", r#"{"name": "hi"}"#, "--json"])
        .assert()
        .success()
        .stdout("\"hi!\"\n");

    crmformula()
        .args(["-c", "0/0", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r##"{"error":"#ERR: NaN"}"##));
}

#[test]
fn test_row_must_be_object() {
    crmformula()
        .args(["-c", "1", "--row-json", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Row must be a JSON object"));
}

#[test]
fn test_render_table_markdown() {
    let rows = write_temp(
        r#"[
            {"name": "Acme", "price": 10, "qty": 3, "orders": [{"total": 5}, {"total": 7}]},
            {"name": "Globex", "price": 4, "orders": []}
        ]"#,
        ".json",
    );
    let columns = write_temp(
        r#"
        [[columns]]
        key = "name"
        label = "Company"

        [[columns]]
        key = "total"
        label = "Total"
        type = "formula"
        formula = "{price} * {qty}"

        [[columns]]
        key = "revenue"
        type = "formula"
        formula = "{orders.total}"
        "#,
        ".toml",
    );

    crmformula()
        .arg("--rows")
        .arg(rows.path())
        .arg("--columns")
        .arg(columns.path())
        .assert()
        .success()
        .stdout(
            "| Company | Total | revenue |\n\
             |---|---|---|\n\
             | Acme | 30 | 12 |\n\
             | Globex | 0 | 0 |\n",
        );
}

#[test]
fn test_render_table_without_columns_uses_row_keys() {
    let rows = write_temp(r#"[{"b": 2, "a": "x"}]"#, ".json");
    crmformula()
        .arg("--rows")
        .arg(rows.path())
        .assert()
        .success()
        .stdout("| a | b |\n|---|---|\n| x | 2 |\n");
}

#[test]
fn test_render_table_warns_on_invalid_formula() {
    let rows = write_temp(r#"[{"a": 1}]"#, ".json");
    let columns = write_temp(
        "[[columns]]\nkey = \"bad\"\ntype = \"formula\"\nformula = \"{a} +\"\n",
        ".toml",
    );
    crmformula()
        .arg("--rows")
        .arg(rows.path())
        .arg("--columns")
        .arg(columns.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("| #ERR: Syntax |"))
        .stderr(predicate::str::contains("invalid formula column"));
}

#[test]
fn test_output_conflicts_with_json() {
    let rows = write_temp(r#"[{"a": 1}]"#, ".json");
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("table.md");
    crmformula()
        .arg("--rows")
        .arg(rows.path())
        .arg("--json")
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
    assert!(!out.exists());
}

#[test]
fn test_negative_zero_cell() {
    let rows = write_temp(r#"[{"a": 1}]"#, ".json");
    let columns = write_temp(
        "[[columns]]\nkey = \"neg\"\ntype = \"formula\"\nformula = \"{missing} * -1\"\n",
        ".toml",
    );
    crmformula()
        .arg("--rows")
        .arg(rows.path())
        .arg("--columns")
        .arg(columns.path())
        .assert()
        .success()
        .stdout("| neg |\n|---|\n| 0 |\n");
}

#[test]
fn test_deeply_nested_formula_is_contained() {
    let formula = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    let (stdout, _, code) = run_command(&["-c", &formula]);
    assert_eq!(stdout.trim(), "#ERR: Syntax");
    assert_eq!(code, 1);
}

#[test]
fn test_list_functions() {
    crmformula()
        .arg("--list-functions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Math.round"));
}
