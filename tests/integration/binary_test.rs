//! Tests running the built `gql-batch` binary in dry-run mode.

use serde_json::{json, Value};
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Writes the inputs and runs the binary inside `dir` with `extra` arguments.
///
/// The binary reads its config from `dir/config.toml`, which only exists if
/// the test writes it.
fn run(dir: &TempDir, query: &str, csv: &str, extra: &[&str]) -> Output {
    let path = dir.path();
    fs::write(path.join("query.gql"), query).unwrap();
    fs::write(path.join("input.csv"), csv).unwrap();

    Command::new(env!("CARGO_BIN_EXE_gql-batch"))
        .current_dir(path)
        .env_remove("GQL_BATCH_ENDPOINT")
        .env_remove("GQL_BATCH_BEARER")
        .env("RUST_LOG", "warn")
        .args([
            "--host",
            "http://localhost:4000/graphql",
            "--input",
            "input.csv",
            "--query",
            "query.gql",
            "--config",
        ])
        .arg(path.join("config.toml"))
        .arg("--dry-run")
        .args(extra)
        .output()
        .unwrap()
}

fn stdout_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_dry_run_prints_one_document_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &dir,
        "query($city: String){weather(city:$city)}",
        "city\nParis\nBerlin\n",
        &["--concurrency", "1"],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_lines(&output),
        vec![
            json!({"variables": {"city": "Paris"}}),
            json!({"variables": {"city": "Berlin"}}),
        ]
    );
}

#[test]
fn test_missing_variable_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &dir,
        "query($city: String, $country: String){weather(city:$city)}",
        "city\nParis\n",
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("country"), "stderr: {}", stderr(&output));
}

#[test]
fn test_row_failures_exit_with_status_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &dir,
        "query($city: String, $country: String){weather(city:$city)}",
        "city,country\nParis,FR\nBerlin\n",
        &["--concurrency", "2", "--output", "jsonl"],
    );

    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["status"], "ok");
    assert_eq!(lines[1]["status"], "error");
    assert_eq!(lines[1]["row"], 2);
}

#[test]
fn test_data_mode_reports_failed_rows_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("gql-batch.log");
    let output = run(
        &dir,
        "query($city: String, $country: String){weather(city:$city)}",
        "city,country\nParis,FR\n\nBerlin\n",
        &["--concurrency", "2", "--log-file", log.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
    assert_eq!(stdout_lines(&output).len(), 1);
    assert!(
        stderr(&output).contains("Failed row 2 (line 4) (variables: -)"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_unbounded_row_failure_fails_batch() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &dir,
        "query($city: String){weather(city:$city)}",
        "city,country\nParis,FR\nBerlin\n",
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("row 2"), "stderr: {}", stderr(&output));
}

#[test]
fn test_config_file_supplies_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "delimiter = \";\"\noutput = \"jsonl\"\n",
    )
    .unwrap();

    let output = run(&dir, "query($a: String, $b: String){x}", "a;b\n1;2\n", &[]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_lines(&output),
        vec![json!({
            "row": 1,
            "line": 2,
            "variables": {"a": "1", "b": "2"},
            "status": "ok",
            "data": {"variables": {"a": "1", "b": "2"}}
        })]
    );
}

#[test]
fn test_unreadable_input_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_gql-batch"))
        .current_dir(dir.path())
        .env_remove("GQL_BATCH_ENDPOINT")
        .args([
            "--host",
            "http://localhost:4000/graphql",
            "--input",
            "nope.csv",
            "--query",
            "nope.gql",
            "--dry-run",
        ])
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Load Error"));
}
