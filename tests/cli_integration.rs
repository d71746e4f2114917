//! Integration tests for the `oi` CLI.
//!
//! Each test initializes a temp project with remotes disabled, runs `oi` as a
//! subprocess, and verifies stdout and/or the backing files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn oi_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_oi"))
}

/// Run `oi` with the given args in the given directory, returning (stdout, stderr, success).
fn run_oi(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(oi_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run oi");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `oi` expecting success, return stdout.
fn run_oi_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_oi(dir, args);
    if !success {
        panic!(
            "oi {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// `oi init` + `oi remote off`
fn offline_project() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_oi_ok(tmp.path(), &["init"]);
    run_oi_ok(tmp.path(), &["remote", "off"]);
    tmp
}

/// Create an issue and return the `#ref` it was printed with
fn add(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let out = run_oi_ok(dir, &full);
    out.trim()
        .strip_prefix("Created todo ")
        .unwrap_or_else(|| panic!("unexpected add output: {}", out))
        .to_string()
}

fn stored_issues(dir: &Path) -> Vec<serde_json::Value> {
    let raw = fs::read_to_string(dir.join(".openissue/issues.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ---------------------------------------------------------------------------
// Project setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_data_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_oi_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized openissue project"));
    for name in [".gitkeep", "config.toml", "issues.json", "agent-tasks.json"] {
        assert!(tmp.path().join(".openissue").join(name).exists(), "{}", name);
    }

    let (_, stderr, success) = run_oi(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_oi(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_remote_off_is_reported() {
    let tmp = offline_project();
    let out = run_oi_ok(tmp.path(), &["remote"]);
    assert!(out.contains("mode: off"));
    assert!(out.contains("remote: none"));

    let config = fs::read_to_string(tmp.path().join(".openissue/config.toml")).unwrap();
    assert!(config.contains("mode = \"off\""));
}

// ---------------------------------------------------------------------------
// Issue lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_list_empty() {
    let tmp = offline_project();
    assert_eq!(run_oi_ok(tmp.path(), &["list"]).trim(), "No issues");
}

#[test]
fn test_add_and_list() {
    let tmp = offline_project();
    let first = add(tmp.path(), &["Fix parser", "--label", "bug"]);
    let second = add(tmp.path(), &["Write docs"]);

    let out = run_oi_ok(tmp.path(), &["list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("[ ] {}", first)));
    assert!(lines[0].ends_with("Fix parser  (bug)"));
    assert!(lines[1].contains(&second));

    let out = run_oi_ok(tmp.path(), &["list", "--label", "bug"]);
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn test_add_is_durable() {
    let tmp = offline_project();
    add(tmp.path(), &["Persisted", "--body", "see @src/main.rs#3-5"]);

    let issues = stored_issues(tmp.path());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["title"], "Persisted");
    assert_eq!(issues[0]["status"], "open");
    assert_eq!(issues[0]["files"].as_array().unwrap().len(), 1);
    assert!(issues[0].get("remoteNumber").is_none());
}

#[test]
fn test_blank_title_is_rejected() {
    let tmp = offline_project();
    let (_, stderr, success) = run_oi(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
    assert!(stored_issues(tmp.path()).is_empty());
}

#[test]
fn test_show_by_reference() {
    let tmp = offline_project();
    let reference = add(tmp.path(), &["Crash on start", "--body", "Steps:\n1. run it"]);

    let out = run_oi_ok(tmp.path(), &["show", &reference]);
    assert!(out.starts_with(&format!("[ ] {} Crash on start", reference)));
    assert!(out.contains("status: open"));
    assert!(out.contains("remote: (local only)"));
    assert!(out.contains("1. run it"));

    let (_, stderr, success) = run_oi(tmp.path(), &["show", "#nope"]);
    assert!(!success);
    assert!(stderr.contains("no issue matches '#nope'"));
}

#[test]
fn test_close_reopen_and_filter() {
    let tmp = offline_project();
    let open = add(tmp.path(), &["Stays open"]);
    let done = add(tmp.path(), &["Gets closed"]);

    let out = run_oi_ok(tmp.path(), &["close", &done]);
    assert_eq!(out.trim(), format!("Closed {}", done));

    let out = run_oi_ok(tmp.path(), &["list", "--state", "closed"]);
    assert!(out.contains(&format!("[x] {}", done)));
    assert!(!out.contains(&open));

    let out = run_oi_ok(tmp.path(), &["reopen", &done]);
    assert_eq!(out.trim(), format!("Reopened {}", done));
    let out = run_oi_ok(tmp.path(), &["list", "--state", "open"]);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_edit_title_and_body() {
    let tmp = offline_project();
    let reference = add(tmp.path(), &["Old"]);

    let out = run_oi_ok(tmp.path(), &["edit", &reference, "--title", "New", "--body", "Details"]);
    assert_eq!(out.trim(), format!("Updated todo {}", reference));

    let issues = stored_issues(tmp.path());
    assert_eq!(issues[0]["title"], "New");
    assert_eq!(issues[0]["body"], "Details");

    let (_, _, success) = run_oi(tmp.path(), &["edit", &reference]);
    assert!(!success);
}

#[test]
fn test_rm_removes_record() {
    let tmp = offline_project();
    let reference = add(tmp.path(), &["Temporary"]);
    let out = run_oi_ok(tmp.path(), &["rm", &reference]);
    assert_eq!(out.trim(), format!("Removed {}", reference));
    assert!(stored_issues(tmp.path()).is_empty());
}

#[test]
fn test_list_json() {
    let tmp = offline_project();
    let reference = add(tmp.path(), &["Json me", "--label", "a", "--label", "b"]);

    let out = run_oi_ok(tmp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(
        format!("#{}", arr[0]["displayId"].as_str().unwrap()),
        reference
    );
    assert_eq!(arr[0]["labels"], serde_json::json!(["a", "b"]));
}

#[test]
fn test_add_json_reports_issue() {
    let tmp = offline_project();
    let out = run_oi_ok(tmp.path(), &["add", "From json", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(parsed["message"].as_str().unwrap().starts_with("Created todo #"));
    assert_eq!(parsed["issue"]["title"], "From json");
    assert!(parsed.get("remote_error").is_none());
}

// ---------------------------------------------------------------------------
// Remote-only commands degrade with a clear error
// ---------------------------------------------------------------------------

#[test]
fn test_sync_without_remote_fails() {
    let tmp = offline_project();
    let (_, stderr, success) = run_oi(tmp.path(), &["sync"]);
    assert!(!success);
    assert!(stderr.contains("no remote available"));
}

#[test]
fn test_agent_list_empty() {
    let tmp = offline_project();
    let out = run_oi_ok(tmp.path(), &["agent"]);
    assert!(out.contains("No agent tasks"));

    let (_, stderr, success) = run_oi(tmp.path(), &["agent", "sync"]);
    assert!(!success);
    assert!(stderr.contains("agent tasks need a GitHub remote"));
}

#[test]
fn test_recovery_log_starts_empty() {
    let tmp = offline_project();
    assert_eq!(
        run_oi_ok(tmp.path(), &["recovery"]).trim(),
        "Recovery log is empty"
    );
    let out = run_oi_ok(tmp.path(), &["recovery", "path"]);
    assert!(out.trim().ends_with(".recovery.log"));
}
