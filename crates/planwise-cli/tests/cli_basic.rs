//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;
use tempfile::TempDir;

/// A Saturday.
const DATE: &str = "2026-10-17";

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_planwise"))
        .env("PLANWISE_DATA_DIR", data_dir.path())
        .env_remove("RUST_LOG")
        .args(["--date", DATE])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn list_json(data_dir: &TempDir) -> Vec<serde_json::Value> {
    let (code, stdout, _) = run_cli(data_dir, &["task", "list", "--json"]);
    assert_eq!(code, 0, "Task list JSON failed");
    serde_json::from_str(&stdout).expect("list output is JSON")
}

#[test]
fn test_task_add_and_list() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &dir,
        &["task", "add", "Standup", "--type", "daily", "--category", "work", "--start", "09:00"],
    );
    assert_eq!(code, 0, "Task add failed");
    assert!(stdout.contains("Task created:"));

    let tasks = list_json(&dir);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Standup");
    assert_eq!(tasks[0]["type"], "daily");
    assert_eq!(tasks[0]["frequency"], "daily");
    assert_eq!(tasks[0]["startTime"], "09:00");
}

#[test]
fn test_task_list_empty() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["task", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No tasks."));
}

#[test]
fn test_task_add_rejects_invalid_fields() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["task", "add", "Read", "--start", "09:00"]);
    assert_ne!(code, 0);
    assert!(stderr.starts_with("error:"));
    assert!(list_json(&dir).is_empty());
}

#[test]
fn test_category_conflict_blocks_save() {
    let dir = TempDir::new().unwrap();
    let add = |title: &str, start: &str, category: &str| {
        run_cli(
            &dir,
            &["task", "add", title, "--type", "daily", "--category", category, "--start", start],
        )
    };

    assert_eq!(add("Review", "09:00", "work").0, 0);
    let (code, _, stderr) = add("Planning", "09:30", "work");

    assert_ne!(code, 0);
    assert!(stderr.contains("another work task at 09:00"));
    assert!(stderr.contains("suggested start: 10:00"));
    assert_eq!(list_json(&dir).len(), 1);
}

#[test]
fn test_overlap_warning_still_saves() {
    let dir = TempDir::new().unwrap();
    let add = |title: &str, start: &str, category: &str| {
        run_cli(
            &dir,
            &["task", "add", title, "--type", "daily", "--category", category, "--start", start],
        )
    };

    assert_eq!(add("Review", "09:00", "work").0, 0);
    let (code, _, stderr) = add("School run", "09:30", "family");

    assert_eq!(code, 0);
    assert!(stderr.contains("warning: another task at 09:00"));
    assert_eq!(list_json(&dir).len(), 2);
}

#[test]
fn test_strict_warnings_blocks_overlap() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_cli(&dir, &["config", "set", "cli.strict_warnings", "true"]).0, 0);
    run_cli(&dir, &["task", "add", "Review", "--type", "daily", "--category", "work", "--start", "09:00"]);

    let (code, _, _) = run_cli(
        &dir,
        &["task", "add", "School run", "--type", "daily", "--category", "family", "--start", "09:30"],
    );

    assert_ne!(code, 0);
    assert_eq!(list_json(&dir).len(), 1);
}

#[test]
fn test_check_json_does_not_save() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Review", "--type", "daily", "--category", "work", "--start", "09:00"]);

    let (code, stdout, _) = run_cli(
        &dir,
        &["check", "Planning", "--type", "daily", "--category", "work", "--start", "09:30", "--json"],
    );
    assert_eq!(code, 0);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["hasConflicts"], true);
    assert_eq!(report["severity"], "error");
    assert_eq!(report["suggestionVerified"], true);
    assert_eq!(report["conflicts"][0]["startTime"], "09:00");
    assert_eq!(report["suggestedStart"], "10:00");
    assert_eq!(list_json(&dir).len(), 1);
}

#[test]
fn test_optimize_places_flexible_task() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Standup", "--type", "daily", "--category", "work", "--start", "08:00"]);
    run_cli(&dir, &["task", "add", "Lunch", "--type", "once", "--category", "family", "--start", "12:00"]);
    run_cli(&dir, &["task", "add", "Read"]);

    let (code, stdout, _) = run_cli(&dir, &["optimize"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("07:00  Read"));

    let read = list_json(&dir)
        .into_iter()
        .find(|t| t["title"] == "Read")
        .unwrap();
    assert_eq!(read["suggestedTime"], "07:00");
}

#[test]
fn test_optimize_json_uses_camel_case() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Standup", "--type", "daily", "--category", "work", "--start", "08:00"]);
    run_cli(&dir, &["task", "add", "Read"]);

    let (code, stdout, _) = run_cli(&dir, &["optimize", "--json"]);
    assert_eq!(code, 0);

    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["status"], "optimized");
    assert_eq!(outcome["assignments"][0]["suggestedTime"], "07:00");
    assert!(outcome["freeSlots"].is_array());
    assert!(outcome.get("free_slots").is_none());
}

#[test]
fn test_optimize_without_flexible_tasks() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Standup", "--type", "daily", "--start", "08:00"]);

    let (code, stdout, _) = run_cli(&dir, &["optimize", "--json"]);
    assert_eq!(code, 0);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["status"], "nothing_to_optimize");
}

#[test]
fn test_agenda_orders_by_start_time() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Read"]);
    run_cli(&dir, &["task", "add", "Lunch", "--type", "once", "--category", "family", "--start", "12:00"]);
    run_cli(&dir, &["task", "add", "Pills", "--type", "daily", "--category", "medicine", "--start", "08:00"]);
    run_cli(
        &dir,
        &["task", "add", "Standup", "--type", "daily", "--frequency", "weekdays", "--start", "09:00"],
    );

    let (code, stdout, _) = run_cli(&dir, &["agenda", "--json"]);
    assert_eq!(code, 0);

    let agenda: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    let titles: Vec<&str> = agenda
        .iter()
        .map(|item| item["task"]["title"].as_str().unwrap())
        .collect();
    // Standup is weekdays only and DATE is a Saturday.
    assert_eq!(titles, vec!["Pills", "Lunch", "Read"]);
    assert_eq!(agenda[0]["displayTime"], "08:00");
    assert_eq!(agenda[2]["displayTime"], "Flexible");
}

#[test]
fn test_task_toggle_and_delete() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["task", "add", "Read"]);
    let id = list_json(&dir)[0]["id"].as_str().unwrap().to_string();

    assert_eq!(run_cli(&dir, &["task", "toggle", &id]).0, 0);
    assert_eq!(list_json(&dir)[0]["completed"], true);

    assert_eq!(run_cli(&dir, &["task", "delete", &id]).0, 0);
    assert!(list_json(&dir).is_empty());
    assert_ne!(run_cli(&dir, &["task", "delete", &id]).0, 0);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "get", "optimizer.window_start"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "07:00");

    assert_eq!(run_cli(&dir, &["config", "set", "conflict.probe_step_minutes", "15"]).0, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "conflict.probe_step_minutes"]);
    assert_eq!(stdout.trim(), "15");

    assert_ne!(run_cli(&dir, &["config", "get", "no.such_key"]).0, 0);
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("planwise"));
}
