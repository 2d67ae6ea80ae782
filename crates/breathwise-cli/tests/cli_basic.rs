//! Basic CLI E2E tests.
//!
//! Each test points the CLI at its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against `data_dir` and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_breathwise-cli"))
        .env("BREATHWISE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn list_json(data_dir: &Path) -> serde_json::Value {
    let (code, stdout, _) = run_cli(data_dir, &["reminders", "list", "--json"]);
    assert_eq!(code, 0, "reminders list failed");
    serde_json::from_str(&stdout).expect("list output is JSON")
}

#[test]
fn test_reminders_list_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let list = list_json(dir.path());
    let slots = list.as_array().unwrap();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0]["label"], "Morning");
    assert_eq!(slots[0]["time"], "07:00 AM");
    assert_eq!(slots[3]["time"], "10:00 PM");
}

#[test]
fn test_notify_reconcile_without_saved_list() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["notify", "reconcile", "--json"]);
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["outcome"], "nothing_configured");
    assert_eq!(report["installed"].as_array().unwrap().len(), 0);
}

#[test]
fn test_reset_schedules_four_reminders() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["reminders", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("scheduled 4 reminder(s)"));

    let (code, stdout, _) = run_cli(dir.path(), &["notify", "pending", "--json"]);
    assert_eq!(code, 0);
    let pending: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 4);
}

#[test]
fn test_toggle_disables_a_slot() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["reminders", "toggle", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[1] disabled"));
    assert!(stdout.contains("scheduled 3 reminder(s)"));

    let list = list_json(dir.path());
    assert_eq!(list[1]["enabled"], false);
    assert_eq!(list[0]["enabled"], true);
}

#[test]
fn test_set_time_and_add() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["reminders", "set-time", "0", "7:30 am"]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(
        dir.path(),
        &["reminders", "add", "Afternoon", "3:15 PM", "--disabled"],
    );
    assert_eq!(code, 0);

    let list = list_json(dir.path());
    let slots = list.as_array().unwrap();
    assert_eq!(slots.len(), 5);
    assert_eq!(slots[0]["time"], "7:30 AM");
    assert_eq!(slots[4]["label"], "Afternoon");
    assert_eq!(slots[4]["enabled"], false);
}

#[test]
fn test_invalid_time_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["reminders", "set-time", "0", "13:00 PM"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    // nothing was saved
    let (_, stdout, _) = run_cli(dir.path(), &["notify", "reconcile", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["outcome"], "nothing_configured");
}

#[test]
fn test_remove_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["reminders", "remove", "9"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_cancel_all_clears_pending() {
    let dir = tempfile::tempdir().unwrap();
    let _ = run_cli(dir.path(), &["reminders", "reset"]);
    let (code, stdout, _) = run_cli(dir.path(), &["notify", "cancel-all"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("all reminders canceled"));

    let (_, stdout, _) = run_cli(dir.path(), &["notify", "pending", "--json"]);
    let pending: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(pending.as_array().unwrap().is_empty());
}

#[test]
fn test_disabled_notifications_deny_permission() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "notifications.enabled", "false"]);
    assert_eq!(code, 0);

    let (code, _, stderr) = run_cli(dir.path(), &["reminders", "reset"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Notification permissions are required"));

    let (_, stdout, _) = run_cli(dir.path(), &["notify", "pending", "--json"]);
    let pending: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(pending.as_array().unwrap().is_empty());
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "session.duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "session.duration_secs", "90"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "session.duration_secs"]);
    assert_eq!(stdout.trim(), "90");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "nope.missing"]);
    assert_eq!(code, 1);
}

#[test]
fn test_session_run_short() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["session", "run", "--duration", "1", "--prepare", "0"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Complete"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("breathwise-cli"));
}
