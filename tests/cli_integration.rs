#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn weekly_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("weekly"));
    cmd.env("WEEKLY_HOME", data_dir.as_os_str())
        .env_remove("WEEKLY_LOG")
        .arg("--no-color");
    cmd
}

/// A data dir with UTC settings and one "Music practice" habit (goal 3).
fn setup_with_habit() -> TempDir {
    let temp = TempDir::new().unwrap();
    weekly_cmd(temp.path())
        .args(["settings", "--timezone", "UTC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved"));
    weekly_cmd(temp.path())
        .args(["habit", "add", "Music", "practice", "--goal", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added habit 1. Music practice"));
    temp
}

#[test]
fn test_log_shows_weekly_progress() {
    let temp = setup_with_habit();

    weekly_cmd(temp.path())
        .args(["log", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("This week: 1 / 3 sessions"));

    weekly_cmd(temp.path())
        .args(["week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Music practice"))
        .stdout(predicate::str::contains("1 / 3 sessions"));

    // Naked execution shows the week too
    weekly_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 / 3 sessions"));
}

#[test]
fn test_state_is_persisted_under_storage_key() {
    let temp = setup_with_habit();
    let blob = fs::read_to_string(temp.path().join("weekly-companion_v1.json")).unwrap();
    assert!(blob.contains("\"schemaVersion\":1"));
    assert!(blob.contains("Music practice"));
}

#[test]
fn test_undo_removes_latest_log() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path()).args(["log", "1"]).assert().success();
    weekly_cmd(temp.path())
        .args(["log", "Music practice", "--amount", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("This week: 3 / 3 sessions"));

    weekly_cmd(temp.path())
        .args(["undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 from Music practice"));

    weekly_cmd(temp.path())
        .args(["week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 / 3 sessions"));
}

#[test]
fn test_undo_unknown_log_fails() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["undo", "00000000-0000-4000-8000-000000000999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Log not found"));

    weekly_cmd(temp.path())
        .args(["undo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to undo"));
}

#[test]
fn test_paused_habit_rejects_logging() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["habit", "pause", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paused 'Music practice'"));

    weekly_cmd(temp.path())
        .args(["log", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resume it before logging"));

    weekly_cmd(temp.path())
        .args(["habit", "list", "--status", "paused"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Music practice"));

    weekly_cmd(temp.path())
        .args(["habit", "resume", "Music practice"])
        .assert()
        .success();
    weekly_cmd(temp.path()).args(["log", "1"]).assert().success();
}

#[test]
fn test_archived_habit_leaves_week_view() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["habit", "archive", "1"])
        .assert()
        .success();

    weekly_cmd(temp.path())
        .args(["week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to track"));
}

#[test]
fn test_delete_habit_removes_logs() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path()).args(["log", "1"]).assert().success();
    weekly_cmd(temp.path()).args(["log", "1"]).assert().success();

    weekly_cmd(temp.path())
        .args(["habit", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("and 2 log(s)"));

    weekly_cmd(temp.path())
        .args(["habit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No habits yet"));
}

#[test]
fn test_unknown_habit_selector() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["log", "Swimming"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No habit matches 'Swimming'"));
}

#[test]
fn test_backfilled_log_uses_settings_timezone() {
    let temp = TempDir::new().unwrap();
    weekly_cmd(temp.path())
        .args(["settings", "--timezone", "America/Los_Angeles"])
        .assert()
        .success();
    weekly_cmd(temp.path())
        .args(["habit", "add", "Walk"])
        .assert()
        .success();

    weekly_cmd(temp.path())
        .args(["log", "Walk", "--at", "2025-01-01T03:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on 2024-12-31"));
}

#[test]
fn test_settings_reject_unknown_timezone() {
    let temp = TempDir::new().unwrap();
    weekly_cmd(temp.path())
        .args(["settings", "--timezone", "Mars/Olympus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone: Mars/Olympus"));
}

#[test]
fn test_settings_show_and_update() {
    let temp = TempDir::new().unwrap();
    weekly_cmd(temp.path())
        .args(["settings", "--timezone", "UTC", "--week-start", "sunday"])
        .assert()
        .success();

    weekly_cmd(temp.path())
        .args(["settings", "--reflections", "on"])
        .assert()
        .success();

    weekly_cmd(temp.path())
        .args(["settings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sunday"))
        .stdout(predicate::str::contains("UTC"))
        .stdout(predicate::str::contains("demo-user"));
}

#[test]
fn test_reflection_answers_are_saved() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["reflect", "--answer", "Practised scales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved reflection"))
        .stdout(predicate::str::contains("Practised scales"))
        .stdout(predicate::str::contains("(no answer yet)"));

    weekly_cmd(temp.path())
        .args(["reflect", "-a", "Practised scales", "-a", "Chords"])
        .assert()
        .success();

    weekly_cmd(temp.path())
        .args(["reflect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chords"))
        .stdout(predicate::str::contains("(no answer yet)").not());
}

#[test]
fn test_too_many_reflection_answers() {
    let temp = setup_with_habit();
    weekly_cmd(temp.path())
        .args(["reflect", "-a", "one", "-a", "two", "-a", "three"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only 2 prompts"));
}

#[test]
fn test_export_then_import_into_fresh_dir() {
    let source = setup_with_habit();
    weekly_cmd(source.path()).args(["log", "1"]).assert().success();

    let export = source.path().join("backup.json");
    weekly_cmd(source.path())
        .args(["export", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 habit(s), 1 log(s)"));

    let target = TempDir::new().unwrap();
    weekly_cmd(target.path())
        .args(["import", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 habit(s) and 1 log(s)"));

    weekly_cmd(target.path())
        .args(["month"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 logs this month"))
        .stdout(predicate::str::contains("Music practice"));
}

#[test]
fn test_invalid_import_keeps_existing_data() {
    let temp = setup_with_habit();
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"settings": null, "habits": {}, "logs": []}"#).unwrap();

    weekly_cmd(temp.path())
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import rejected"))
        .stderr(predicate::str::contains("habits must be an array"));

    weekly_cmd(temp.path())
        .args(["habit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Music practice"));
}

#[test]
fn test_import_rejects_malformed_json() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();

    weekly_cmd(temp.path())
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_newer_schema_is_left_untouched() {
    let temp = TempDir::new().unwrap();
    let blob = r#"{"settings":null,"habits":[],"logs":[],"reflections":[],"schemaVersion":99}"#;
    let path = temp.path().join("weekly-companion_v1.json");
    fs::write(&path, blob).unwrap();

    weekly_cmd(temp.path())
        .args(["habit", "add", "Walk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("newer version"));

    assert_eq!(fs::read_to_string(&path).unwrap(), blob);
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    weekly_cmd(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("weekly "));
}
