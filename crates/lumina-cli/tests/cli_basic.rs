//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with `home` as HOME and return (stdout, stderr, code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_lumina-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("LUMINA_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

fn json(output: &str) -> serde_json::Value {
    serde_json::from_str(output).expect("Failed to parse JSON output")
}

/// Create a task and return its id.
fn add_task(home: &Path, args: &[&str]) -> String {
    let mut full = vec!["task", "add"];
    full.extend_from_slice(args);
    let stdout = run_cli_success(home, &full);
    stdout
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Task created: "))
        .expect("missing task id")
        .to_string()
}

#[test]
fn test_config_defaults() {
    let home = tempfile::tempdir().unwrap();
    let config = json(&run_cli_success(home.path(), &["config", "list"]));
    assert_eq!(config["user"]["id"], "local");
    assert_eq!(config["astrology"]["max_aspects"], 3);

    run_cli_success(home.path(), &["config", "set", "astrology.max_aspects", "5"]);
    let value = run_cli_success(home.path(), &["config", "get", "astrology.max_aspects"]);
    assert_eq!(value.trim(), "5");

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "streak.max_freezes", "4"]);
    assert_ne!(code, 0);
}

#[test]
fn test_task_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let id = add_task(
        home.path(),
        &["Stretch", "--type", "foundation", "--due", "2026-03-10"],
    );
    add_task(home.path(), &["Report", "--due", "2026-03-10"]);

    let listed = json(&run_cli_success(
        home.path(),
        &["task", "list", "--day", "2026-03-10"],
    ));
    assert_eq!(listed["foundation"].as_array().unwrap().len(), 1);
    assert_eq!(listed["regular"].as_array().unwrap().len(), 1);
    assert_eq!(listed["foundation_progress"]["done"], 0);

    run_cli_success(home.path(), &["task", "done", &id]);
    let listed = json(&run_cli_success(
        home.path(),
        &["task", "list", "--day", "2026-03-10"],
    ));
    assert_eq!(listed["foundation_progress"]["done"], 1);

    let (_, stderr, code) = run_cli(home.path(), &["task", "done", "missing-id"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_just_start_prefers_overdue_streak_task() {
    let home = tempfile::tempdir().unwrap();
    add_task(home.path(), &["Deep dive", "--type", "deep-work", "--due", "2026-03-10"]);
    add_task(home.path(), &["Missed", "--streak", "--due", "2026-03-09"]);

    let picked = json(&run_cli_success(
        home.path(),
        &["just-start", "--day", "2026-03-10"],
    ));
    assert_eq!(picked["task"]["title"], "Missed");
    assert_eq!(picked["tier"], "overdue_streak");
}

#[test]
fn test_streak_resolve_is_idempotent() {
    let home = tempfile::tempdir().unwrap();
    let first = json(&run_cli_success(
        home.path(),
        &["streak", "resolve", "--day", "2026-03-10"],
    ));
    assert_eq!(first["status"], "resolved");
    assert_eq!(first["met"], false);

    let second = json(&run_cli_success(
        home.path(),
        &["streak", "resolve", "--day", "2026-03-10"],
    ));
    assert_eq!(second["status"], "already_resolved");
}

#[test]
fn test_streak_status_resolves_yesterday_first() {
    let home = tempfile::tempdir().unwrap();
    let status = json(&run_cli_success(home.path(), &["streak", "status"]));
    assert_eq!(status["streak_count"], 0);

    // Yesterday had no log, so status already recorded it as a miss.
    let resolve = json(&run_cli_success(home.path(), &["streak", "resolve"]));
    assert_eq!(resolve["status"], "already_resolved");
}

#[test]
fn test_checkin_validation() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["checkin", "evening", "9"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let log = json(&run_cli_success(home.path(), &["checkin", "evening", "4"]));
    assert_eq!(log["evening_mood"], 4);
}

#[test]
fn test_transits_without_ephemeris() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["transits", "show"]);
    assert!(stdout.contains("Cosmic weather unavailable"));
}
