//! Integration tests for the forecast-agent binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's config, pointed at a SQLite store in `dir`
fn forecast_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("forecast-agent").unwrap();
    cmd.env("FORECAST_AGENT_CONFIG", dir.join("missing-config.yml"))
        .env("FORECAST_STORE", "sqlite")
        .env("FORECAST_SQLITE_PATH", dir.join("forecasts.sqlite"))
        .env("RAGFLOW_ITEM_NAME_IDS", "")
        .env("PIPELINE_MODE", "direct")
        .env_remove("MODEL_API_KEY")
        .env_remove("RAGFLOW_API_KEY")
        .env_remove("PG_PASSWORD");
    cmd
}

fn write_forecast_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("forecasts.csv");
    fs::write(
        &path,
        "forecast_date,categorylv5,demand_forecast\n\
         2024-10-01,Thermos Flask,120\n\
         2024-11-01,Thermos Flask,140.5\n\
         2024-11-01,Flap Box,\n",
    )
    .unwrap();
    path
}

#[test]
fn test_normalize_splits_commas() {
    let dir = TempDir::new().unwrap();

    forecast_cmd(dir.path())
        .arg("normalize")
        .arg(" widget ,, gadget ")
        .assert()
        .success()
        .stdout("widget\ngadget\n");
}

#[test]
fn test_normalize_json_format() {
    let dir = TempDir::new().unwrap();

    let output = forecast_cmd(dir.path())
        .args(["--format", "json", "normalize", "Paper Cup"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({ "items": ["Paper Cup"] }));
}

#[test]
fn test_run_requires_input() {
    let dir = TempDir::new().unwrap();

    forecast_cmd(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_convert_csv_writes_documents() {
    let dir = TempDir::new().unwrap();
    let csv_path = write_forecast_csv(dir.path());
    let out_dir = dir.path().join("docs");

    forecast_cmd(dir.path())
        .arg("convert-csv")
        .arg(&csv_path)
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 documents"));

    let first = fs::read_to_string(out_dir.join("demand_forecast_1.md")).unwrap();
    assert!(first.contains("categorylv5: Thermos Flask"));
    assert!(out_dir.join("demand_forecast_3.md").exists());
}

#[test]
fn test_import_then_forecast() {
    let dir = TempDir::new().unwrap();
    let csv_path = write_forecast_csv(dir.path());

    forecast_cmd(dir.path())
        .arg("import-csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 forecast rows"));

    forecast_cmd(dir.path())
        .args(["forecast", "Thermos Flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("### Item: Thermos Flask"))
        .stdout(predicate::str::contains("Forecast: 140.5"))
        .stdout(predicate::str::contains("2024-11-01"));

    forecast_cmd(dir.path())
        .args(["forecast", "Unknown Item"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No demand forecast found for item 'Unknown Item'.",
        ));
}

#[test]
fn test_forecast_json_missing_value() {
    let dir = TempDir::new().unwrap();
    let csv_path = write_forecast_csv(dir.path());

    forecast_cmd(dir.path())
        .arg("import-csv")
        .arg(&csv_path)
        .assert()
        .success();

    let output = forecast_cmd(dir.path())
        .args(["--format", "json", "forecast", "Flap Box"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["category_key"], "Flap Box");
    assert!(value["demand_forecast"].is_null());
}

#[test]
fn test_run_without_knowledge_base_reports_no_match() {
    let dir = TempDir::new().unwrap();

    // No dataset ids configured: retrieval is empty and nothing is called
    forecast_cmd(dir.path())
        .args(["run", "Paper Cup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("### Item: None"))
        .stdout(predicate::str::contains(
            "No demand forecast found for item 'Paper Cup' (Matched: None).",
        ));
}

#[test]
fn test_config_masks_secrets() {
    let dir = TempDir::new().unwrap();

    forecast_cmd(dir.path())
        .env("MODEL_API_KEY", "sk-very-secret")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("****"))
        .stdout(predicate::str::contains("sk-very-secret").not());
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.yml");
    fs::write(&config_path, "retrieval:\n  top_k: 0\n").unwrap();

    forecast_cmd(dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("top_k"));
}
