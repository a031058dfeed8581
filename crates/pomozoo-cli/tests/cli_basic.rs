//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomozoo"))
        .args(args)
        .env("POMOZOO_DATA_DIR", data_dir)
        .env_remove("POMOZOO_BACKEND_URL")
        .env_remove("POMOZOO_ANON_KEY")
        .env_remove("POMOZOO_LOG")
        .output()
        .expect("failed to execute pomozoo");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not a single JSON document")
}

#[test]
fn status_on_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["type"], "StateSnapshot");
    assert_eq!(status["mode"], "study");
    assert_eq!(status["time_left"], 25 * 60);
    assert_eq!(status["is_running"], false);
}

#[test]
fn study_countdown_awards_an_animal() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["settings", "set", "study_minutes", "1"]);
    run_ok(dir.path(), &["timer", "start"]);
    let out = run_ok(dir.path(), &["timer", "tick", "--count", "60"]);
    assert!(out.contains("TimerCompleted"));
    assert!(out.contains("AnimalAwarded"));

    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["mode"], "short_break");
    assert_eq!(status["collected_count"], 1);
    assert_eq!(status["today_study_minutes"], 1);

    let fresh = json(&run_ok(dir.path(), &["zoo", "new"]));
    assert_eq!(fresh.as_array().map(Vec::len), Some(1));
    run_ok(dir.path(), &["zoo", "seen"]);
    let fresh = json(&run_ok(dir.path(), &["zoo", "new"]));
    assert_eq!(fresh.as_array().map(Vec::len), Some(0));

    assert_eq!(run_ok(dir.path(), &["stats", "streak"]).trim(), "1");
}

#[test]
fn pause_survives_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    run_ok(dir.path(), &["timer", "tick", "--count", "5"]);
    run_ok(dir.path(), &["timer", "pause"]);
    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["is_paused"], true);
    assert_eq!(status["time_left"], 25 * 60 - 5);

    // Ticks do nothing while paused.
    run_ok(dir.path(), &["timer", "tick", "--count", "5"]);
    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["time_left"], 25 * 60 - 5);

    run_ok(dir.path(), &["timer", "stop"]);
    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["time_left"], 25 * 60);
    assert_eq!(status["collected_count"], 0);
}

#[test]
fn settings_reject_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["settings", "set", "study_minutes", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "nope", "1"]);
    assert_eq!(code, 1);
    assert_eq!(run_ok(dir.path(), &["settings", "get", "study_minutes"]).trim(), "25");
}

#[test]
fn preset_create_and_apply() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["settings", "set", "study_minutes", "50"]);
    let created = json(&run_ok(dir.path(), &["preset", "create", "Deep work"]));
    assert_eq!(created["type"], "PresetCreated");
    let id = created["preset_id"].as_str().unwrap().to_string();

    run_ok(dir.path(), &["settings", "reset"]);
    run_ok(dir.path(), &["preset", "apply", &id]);
    assert_eq!(run_ok(dir.path(), &["settings", "get", "study_minutes"]).trim(), "50");

    let list = json(&run_ok(dir.path(), &["preset", "list"]));
    assert_eq!(list[0]["name"], "Deep work");
    assert_eq!(list[0]["settings"]["study_minutes"], 50);

    let renamed = json(&run_ok(dir.path(), &["preset", "rename", &id, "Long haul"]));
    assert_eq!(renamed["name"], "Long haul");
    let deleted = json(&run_ok(dir.path(), &["preset", "delete", &id]));
    assert_eq!(deleted["type"], "PresetDeleted");
    let (_, _, code) = run_cli(dir.path(), &["preset", "apply", &id]);
    assert_eq!(code, 1);
}

#[test]
fn focus_guard_blocks_only_while_studying() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["settings", "set", "focus_guard_enabled", "true"]);
    run_ok(dir.path(), &["settings", "set", "blocked_apps", "com.example.video"]);

    let (stdout, _, code) = run_cli(dir.path(), &["guard", "check", "com.example.video"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["decision"], "allow");

    run_ok(dir.path(), &["timer", "start"]);
    let (stdout, _, code) = run_cli(dir.path(), &["guard", "check", "COM.EXAMPLE.VIDEO"]);
    assert_eq!(code, 2);
    assert_eq!(json(&stdout)["decision"], "block");
}

#[test]
fn checklist_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let added = json(&run_ok(dir.path(), &["stats", "checklist", "add", "Flashcards"]));
    let id = added["item_id"].as_str().unwrap().to_string();
    run_ok(dir.path(), &["stats", "checklist", "toggle", &id]);
    let items = json(&run_ok(dir.path(), &["stats", "checklist", "list"]));
    assert_eq!(items[0]["done"], true);
    let removed = json(&run_ok(dir.path(), &["stats", "checklist", "remove", &id]));
    assert_eq!(removed["type"], "ChecklistItemRemoved");
    let (_, _, code) = run_cli(dir.path(), &["stats", "checklist", "remove", &id]);
    assert_eq!(code, 1);
    let items = json(&run_ok(dir.path(), &["stats", "checklist", "list"]));
    assert_eq!(items.as_array().map(Vec::len), Some(0));
}

#[test]
fn config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "backend.url", "https://zoo.example"]);
    assert_eq!(
        run_ok(dir.path(), &["config", "get", "backend.url"]).trim(),
        "https://zoo.example"
    );
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn room_commands_need_backend_config() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["room", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not configured"), "{stderr}");
}

#[test]
fn tick_count_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "tick", "--count", "100000000"]);
    assert_eq!(code, 2, "{stderr}");
    let (_, _, code) = run_cli(dir.path(), &["timer", "tick", "--count", "0"]);
    assert_eq!(code, 2);

    let status = json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["time_left"], 25 * 60);
}

#[test]
fn stop_on_idle_timer_prints_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let out = json(&run_ok(dir.path(), &["timer", "stop"]));
    assert_eq!(out["type"], "StateSnapshot");
    assert_eq!(out["progress"], 0.0);
}
