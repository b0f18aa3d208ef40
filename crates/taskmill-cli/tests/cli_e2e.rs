//! End-to-end CLI tests against a throwaway data directory.
//!
//! Each test points `TASKMILL_DATA_DIR` at its own tempdir, so tests are
//! independent and never touch a real database.

use std::process::Command;

use tempfile::TempDir;

fn run(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskmill"))
        .env("TASKMILL_DATA_DIR", dir.path())
        .args(args)
        .output()
        .expect("failed to run taskmill");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(dir: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run(dir, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

#[test]
fn add_and_list_tasks() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["task", "add", "Water the plants", "--tags", "home"]);
    run_ok(&dir, &["task", "add", "Pay rent", "--due", "today", "--priority", "urgent"]);

    let stdout = run_ok(&dir, &["task", "list"]);
    assert!(stdout.contains("Water the plants"));
    assert!(stdout.contains("Pay rent"));

    let stdout = run_ok(&dir, &["task", "list", "--json"]);
    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[test]
fn rejects_unparseable_date() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run(&dir, &["task", "add", "Bad", "--due", "whenever"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("whenever"));
    // Nothing was written.
    let stdout = run_ok(&dir, &["task", "list", "--json"]);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn complete_and_reopen_flow() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["task", "add", "Write report"]);
    run_ok(&dir, &["task", "done", "1"]);

    let stdout = run_ok(&dir, &["task", "list", "--json"]);
    assert_eq!(stdout.trim(), "[]");
    let stdout = run_ok(&dir, &["task", "list", "--completed", "--json"]);
    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    run_ok(&dir, &["task", "reopen", "1"]);
    let stdout = run_ok(&dir, &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["completed"], 0);
}

#[test]
fn move_between_buckets() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["task", "add", "Learn sourdough", "--due", "tomorrow"]);
    run_ok(&dir, &["task", "move", "1", "someday"]);

    let stdout = run_ok(&dir, &["task", "show", "1", "--json"]);
    let task: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(task["placement"], "someday");
    assert_eq!(task["due_date"], serde_json::Value::Null);

    let stdout = run_ok(&dir, &["dashboard", "--json"]);
    let buckets: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(buckets["someday"].as_array().unwrap().len(), 1);
}

#[test]
fn generate_is_idempotent_across_invocations() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["recur", "add", "Journal", "--every", "day"]);

    let stdout = run_ok(&dir, &["generate", "--days", "14", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["templates_processed"], 1);
    assert_eq!(report["tasks_created"], 14);

    let stdout = run_ok(&dir, &["generate", "--days", "14", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["tasks_created"], 0);

    let stdout = run_ok(&dir, &["task", "list", "--json"]);
    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 14);
}

#[test]
fn disabled_template_is_skipped() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["recur", "add", "Journal", "--every", "day"]);
    run_ok(&dir, &["recur", "disable", "1"]);

    let stdout = run_ok(&dir, &["generate", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["templates_processed"], 0);
    assert_eq!(report["tasks_created"], 0);
}

#[test]
fn config_round_trip() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_ok(&dir, &["config", "get", "timezone"]).trim(), "UTC");
    run_ok(&dir, &["config", "set", "timezone", "Europe/Berlin"]);
    assert_eq!(run_ok(&dir, &["config", "get", "timezone"]).trim(), "Europe/Berlin");

    let (_, _, code) = run(&dir, &["config", "set", "timezone", "Nowhere/Atlantis"]);
    assert_ne!(code, 0);
}
