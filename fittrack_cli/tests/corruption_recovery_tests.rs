//! Corruption recovery tests for the fittrack binary.
//!
//! These tests verify the system can handle:
//! - Corrupted record files
//! - Legacy record shapes
//! - Missing data directories
//! - Records with missing or null numeric fields

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fittrack"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("GEMINI_API_KEY");
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_daily_logs_replaced_by_default() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("daily_logs.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted logs");

    cli(data_dir)
        .args(["--date", "2024-03-01", "day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Calories: 0 / 1500 kcal"));

    // The next write replaces the corrupt file with a valid record
    cli(data_dir)
        .args(["--date", "2024-03-01", "water", "250"])
        .assert()
        .success();

    let content = fs::read_to_string(data_dir.join("daily_logs.json")).unwrap();
    let logs: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(logs["2024-03-01"]["waterIntake"], 250);
}

#[test]
fn test_corrupted_profile_uses_default() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("user_profile.json"), "not a profile").unwrap();

    cli(data_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User"))
        .stdout(predicate::str::contains("Goals: 1500 kcal, 2500 ml water"));
}

#[test]
fn test_legacy_profile_without_goals() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("user_profile.json"),
        r#"{"name":"Ada","height":170,"startWeight":70,"currentWeight":68,
            "targetWeight":65,"weightHistory":[{"date":"2024-01-01","weight":70}]}"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("Goals: 1500 kcal, 2500 ml water"));
}

#[test]
fn test_legacy_cycle_history_upgraded() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("cycle_data.json"),
        r#"{"lastPeriodStart":"2024-03-01","cycleLength":28,"periodLength":5,
            "history":["2024-03-01","2024-02-02"]}"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["cycle", "note", "2024-02-02", "light"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Note updated for 2024-02-02"));

    let content = fs::read_to_string(data_dir.join("cycle_data.json")).unwrap();
    let cycle: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(cycle["history"][1]["startDate"], "2024-02-02");
    assert_eq!(cycle["history"][1]["note"], "light");
    assert_eq!(cycle["history"][0]["note"], "");
    assert_eq!(cycle["notificationsEnabled"], true);
    assert_eq!(cycle["predictionMode"], "standard");
}

#[test]
fn test_missing_data_dir_created_on_write() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("not").join("yet");

    cli(&data_dir)
        .args(["--date", "2024-03-01", "weight", "79.5"])
        .assert()
        .success();

    assert!(data_dir.join("user_profile.json").exists());
    // No temp files left behind by the atomic replace
    let leftovers = fs::read_dir(&data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map_or(true, |ext| ext != "json"))
        .count();
    assert_eq!(leftovers, 0);
}

fn corrupt_copies(data_dir: &Path, key: &str) -> Vec<std::path::PathBuf> {
    let prefix = format!("{}.json.corrupt-", key);
    fs::read_dir(data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        .map(|e| e.path())
        .collect()
}

#[test]
fn test_corrupted_daily_logs_kept_aside_before_overwrite() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let original = r#"{"2024-02-01":{"date":"2024-02-01","meals":[{"id":"m1","#;
    fs::write(data_dir.join("daily_logs.json"), original).unwrap();

    cli(data_dir)
        .args(["--date", "2024-03-01", "water", "250"])
        .assert()
        .success();

    // The fresh record replaces the broken one, but the broken bytes survive
    let copies = corrupt_copies(data_dir, "daily_logs");
    assert_eq!(copies.len(), 1, "Expected one set-aside copy");
    assert_eq!(fs::read_to_string(&copies[0]).unwrap(), original);

    let content = fs::read_to_string(data_dir.join("daily_logs.json")).unwrap();
    let logs: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(logs["2024-03-01"]["waterIntake"], 250);
}

#[test]
fn test_meal_with_missing_micronutrients_keeps_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Older records carry only the four main macros, and some carry nulls
    fs::write(
        data_dir.join("daily_logs.json"),
        r#"{"2024-02-01":{"date":"2024-02-01","waterIntake":500,"workouts":[],
            "meals":[{"id":"m1","name":"Toast","timestamp":1706745600000,
            "macros":{"calories":300,"protein":10,"carbs":45,"fat":null}}]}}"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["--date", "2024-03-01", "water", "250"])
        .assert()
        .success();

    assert!(corrupt_copies(data_dir, "daily_logs").is_empty());

    let content = fs::read_to_string(data_dir.join("daily_logs.json")).unwrap();
    let logs: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(logs["2024-02-01"]["meals"][0]["name"], "Toast");
    assert_eq!(logs["2024-02-01"]["meals"][0]["macros"]["calories"], 300.0);
    assert_eq!(logs["2024-02-01"]["meals"][0]["macros"]["fat"], 0.0);
    assert_eq!(logs["2024-02-01"]["meals"][0]["macros"]["sodium"], 0.0);
    assert_eq!(logs["2024-03-01"]["waterIntake"], 250);

    cli(data_dir)
        .args(["--date", "2024-02-01", "day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Calories: 300 / 1500 kcal"));
}
