//! Smoke tests -- verify the binary runs and the subcommands work end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn mediauat(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mediauat").unwrap();
    cmd.current_dir(dir)
        .env_remove("MEDIAUAT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Config pointing suites/reports into `dir` and ffprobe at a binary that
/// does not exist, so media checks skip deterministically.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("uat.toml");
    fs::write(
        &path,
        format!(
            r#"
[paths]
suites_dir = "{suites}"
reports_dir = "{reports}"

[probe]
ffprobe_path = "ffprobe-not-installed-mediauat"
timeout_secs = 5

[logging]
level = "warn"
"#,
            suites = dir.join("suites").display(),
            reports = dir.join("reports").display(),
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    mediauat(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Acceptance-test runner for media and asset pipelines",
        ));
}

#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    mediauat(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mediauat"));
}

#[test]
fn test_subcommands_exist() {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["run", "validate", "list", "init"] {
        mediauat(dir.path()).args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_run_requires_suite_or_all() {
    let dir = tempfile::tempdir().unwrap();
    mediauat(dir.path()).arg("run").assert().failure();
}

#[test]
fn test_run_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    mediauat(dir.path())
        .args(["run", "nightly", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report format"));
}

#[test]
fn test_init_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["init", "pilot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mediauat run pilot_tests"));

    assert!(dir.path().join("suites/pilot_tests.json").is_file());
    assert!(dir.path().join("reports").is_dir());

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("pilot_tests"))
        .stdout(predicate::str::contains("UAT test suite for pilot"));
}

#[test]
fn test_run_writes_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let asset = dir.path().join("plate.json");
    fs::write(&asset, r#"{"version": 2, "name": "plate"}"#).unwrap();

    fs::create_dir_all(dir.path().join("suites")).unwrap();
    fs::write(
        dir.path().join("suites/delivery.json"),
        serde_json::json!({
            "name": "delivery",
            "description": "Delivery checks",
            "tests": [
                { "name": "Plate exists", "type": "file_exists", "params": { "path": asset } },
                { "name": "Plate keys", "type": "json_schema",
                  "params": { "path": asset, "required_keys": ["version", "name"] } },
                { "name": "Codec", "type": "video_codec", "params": { "path": asset } }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let report = dir.path().join("out/report.json");
    mediauat(dir.path())
        .env("MEDIAUAT_CONFIG", &config)
        .args(["run", "delivery", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("ALL TESTS PASSED"));

    let parsed = mediauat::report::parse_json(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(parsed.summary.total, 3);
    assert_eq!(parsed.summary.passed, 2);
    assert_eq!(parsed.summary.skipped, 1);
    assert_eq!(parsed.results[2].status, mediauat::Status::Skipped);
}

#[test]
fn test_run_failure_exits_nonzero_with_html_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let suite = dir.path().join("broken_suite.json");
    fs::write(
        &suite,
        serde_json::json!({
            "name": "broken",
            "tests": [
                { "name": "Missing plate", "type": "file_exists",
                  "params": { "path": dir.path().join("absent.exr") } },
                { "name": "Mystery", "type": "nonexistent" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&suite)
        .args(["--format", "html"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("TESTS FAILED"));

    let reports: Vec<_> = fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let name = reports[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("report_") && name.ends_with(".html"));
    let html = fs::read_to_string(&reports[0]).unwrap();
    assert!(html.contains("Unknown test type: nonexistent"));
}

#[test]
fn test_run_all_without_suites_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["run", "--all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No test suites found"));
}

#[test]
fn test_validate_json_asset() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let asset = dir.path().join("shot.json");
    fs::write(&asset, r#"{"shot": "010"}"#).unwrap();

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg(&asset)
        .assert()
        .success()
        .stdout(predicate::str::contains("Validating: shot.json"))
        .stdout(predicate::str::contains("Valid JSON"));
}

#[test]
fn test_validate_missing_asset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["validate", "missing.mp4"])
        .assert()
        .code(1);
}

#[test]
fn test_loaded_config_is_logged_and_written_to_run_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("logged.toml");
    fs::write(
        &config,
        format!(
            r#"
[paths]
suites_dir = "{suites}"

[logging]
level = "info"
log_dir = "{logs}"
"#,
            suites = dir.path().join("suites").display(),
            logs = dir.path().join("logs").display(),
        ),
    )
    .unwrap();

    mediauat(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration"))
        .stderr(predicate::str::contains("logged.toml"));

    let logs: Vec<_> = fs::read_dir(dir.path().join("logs"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("uat_") && name.ends_with(".log"));
    let content = fs::read_to_string(&logs[0]).unwrap();
    assert!(content.contains("Loaded configuration"));
}

#[test]
fn test_broken_env_config_warns_and_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    mediauat(dir.path())
        .env("MEDIAUAT_CONFIG", dir.path().join("absent.toml"))
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not be loaded"));
}
