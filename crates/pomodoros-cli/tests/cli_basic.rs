//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a temporary
//! directory, so the config file never touches the real one.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomodoros-cli"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("POMODOROS_ENV")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn events(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect()
}

fn types(events: &[serde_json::Value]) -> Vec<String> {
    events
        .iter()
        .map(|e| e["type"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_sounds_lists_catalogue() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["sounds", "--json"], "");
    assert_eq!(code, 0);
    let sounds: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sounds.len(), 23);
    assert!(sounds.contains(&"alarm12".to_string()));
    assert!(!sounds.contains(&"alarm2".to_string()));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&home, &["config", "set", "preferences.alarm_volume", "35"], "");
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(&home, &["config", "get", "preferences.alarm_volume"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "35");

    let (stdout, _, _) = run_cli(&home, &["config", "path"], "");
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(home.path().to_str().unwrap()));
}

#[test]
fn test_config_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "get", "preferences.nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_tasks_list_json_has_default_task() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["tasks", "list", "--json"], "");
    assert_eq!(code, 0);
    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tasks[0]["name"], "Pomodoro");
    assert_eq!(tasks[0]["cycles"], 4);
}

#[test]
fn test_run_zero_length_session_finishes() {
    let home = TempDir::new().unwrap();
    let args = [
        "run",
        "--name",
        "Blink",
        "--focus",
        "0",
        "--short-break",
        "0",
        "--long-break",
        "0",
        "--cycles",
        "2",
        "--alarm",
        "None",
    ];
    let (stdout, _, code) = run_cli(&home, &args, "");
    assert_eq!(code, 0);
    let events = events(&stdout);
    assert_eq!(
        types(&events),
        vec![
            "session_started",
            "phase_started",
            "phase_completed",
            "phase_started",
            "phase_completed",
            "phase_started",
            "phase_completed",
            "phase_started",
            "phase_completed",
            "session_finished",
        ]
    );
    assert_eq!(events[0]["task"], "Blink");
    assert_eq!(events[3]["phase"], "short_break");
    assert_eq!(events[7]["phase"], "long_break");
}

#[test]
fn test_run_stop_from_stdin() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["run", "--focus", "5"], "status\nstop\nquit\n");
    assert_eq!(code, 0);
    let lines = events(&stdout);
    assert!(lines.iter().any(|e| e["task"] == "Pomodoro" && e["running"] == true));
    assert_eq!(types(&lines).last().map(String::as_str), Some("session_stopped"));
}

#[test]
fn test_run_exits_when_stopped_and_stdin_closes() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["run", "--focus", "5"], "stop\n");
    assert_eq!(code, 0);
    let lines = events(&stdout);
    assert_eq!(types(&lines).last().map(String::as_str), Some("session_stopped"));
}

#[test]
fn test_run_rejects_tick_interval_below_minimum() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--tick-ms", "0"], "");
    assert_eq!(code, 2);
    assert!(stderr.contains("--tick-ms"));
}

#[test]
fn test_run_rejects_task_with_inline_alarm() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--task", "Pomodoro", "--alarm", "alarm1"], "");
    assert_eq!(code, 2);
    assert!(stderr.contains("cannot be used with"));
}

#[test]
fn test_run_rejects_zero_cycles() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--cycles", "0"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("cycles"));
}

#[test]
fn test_run_unknown_task_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--task", "Nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("no task named"));
}
