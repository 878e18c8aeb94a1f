//! CLI integration tests for revive
//!
//! Tests the revive CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a command with an isolated config dir and no API key
#[allow(deprecated)]
fn revive_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("revive").unwrap();
    cmd.env("REVIVE_CONFIG_DIR", config_dir.path());
    cmd.env_remove("GEMINI_API_KEY");
    cmd.env_remove("API_KEY");
    cmd.current_dir(config_dir.path());
    cmd
}

#[test]
fn test_config_path_uses_override_dir() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .args(["config", "set", "restoration.default_strength", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set restoration.default_strength = 40"));

    revive_cmd(&dir)
        .args(["config", "get", "restoration.default_strength"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40"));

    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_list_shows_defaults() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restoration.model = gemini-2.5-flash-image"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .args(["config", "get", "nope"])
        .assert()
        .failure();
}

#[test]
fn test_doctor_reports_missing_key() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[!!] API Key"));
}

#[test]
fn test_doctor_json() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .args(["doctor", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overall_status\""));
}

#[test]
fn test_models_lists_default() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("* gemini-2.5-flash-image"));
}

#[test]
fn test_restore_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "just text").unwrap();

    revive_cmd(&dir)
        .env("GEMINI_API_KEY", "test-key")
        .arg("restore")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vui lòng tải lên một tệp ảnh hợp lệ."))
        .stderr(predicate::str::contains("E001"));
}

#[test]
fn test_restore_without_key_fails_without_network() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("old.png");
    std::fs::write(&input, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

    revive_cmd(&dir)
        .arg("restore")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Không thể chọn API key. Vui lòng cấu hình biến môi trường API_KEY.",
        ))
        .stderr(predicate::str::contains("E100"))
        .stderr(predicate::str::contains("GEMINI_API_KEY"));

    assert!(!dir.path().join("restored_image.png").exists());
}

#[test]
fn test_restore_failure_follows_configured_locale() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "just text").unwrap();

    revive_cmd(&dir)
        .args(["config", "set", "ui.locale", "en"])
        .assert()
        .success();

    revive_cmd(&dir)
        .env("GEMINI_API_KEY", "test-key")
        .arg("restore")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please upload a valid image file."))
        .stderr(predicate::str::contains("Vui lòng").not());
}

#[test]
fn test_restore_missing_file() {
    let dir = TempDir::new().unwrap();

    revive_cmd(&dir)
        .env("GEMINI_API_KEY", "test-key")
        .args(["restore", "does-not-exist.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E400"));
}
