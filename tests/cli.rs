use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

/// Command isolated from the user's config and saved settings.
fn searchpane(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("searchpane").unwrap();
    cmd.env("SEARCHPANE_STORAGE_DIR", dir.join("data"))
        .env("SEARCHPANE_CONFIG", dir.join("missing.toml"))
        .env("SEARCHPANE_HTTP_TIMEOUT_SECS", "2")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn robot_json(cmd: &mut Command, args: &[&str]) -> Value {
    let output = cmd.arg("--robot").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn configure(dir: &TempDir, host: &str) {
    searchpane(dir.path())
        .args([
            "config",
            "set",
            "--host",
            host,
            "--api-key",
            "masterKey",
            "--index",
            "movies",
            "--title-attr",
            "title",
        ])
        .assert()
        .success();
}

fn mock_engine(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).json_body(json!({"status": "available"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/indexes")
            .header("authorization", "Bearer masterKey");
        then.status(200)
            .json_body(json!({"results": [{"uid": "movies"}], "total": 1}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/indexes/movies/settings/embedders");
        then.status(200)
            .json_body(json!({"default": {"source": "openAi"}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/indexes/movies/stats");
        then.status(200).json_body(json!({
            "numberOfDocuments": 2,
            "fieldDistribution": {"id": 2, "title": 2, "overview": 1}
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/indexes/movies/search");
        then.status(200)
            .json_body(json!({"hits": [{"id": 7, "title": "Dune"}]}));
    });
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("searchpane").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("searchpane").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_config_defaults_when_nothing_saved() {
    let dir = tempdir().unwrap();
    let json = robot_json(&mut searchpane(dir.path()), &["config", "show"]);
    assert_eq!(json["host"], "");
    assert_eq!(json["hybridRatio"], 0.5);
}

#[test]
fn test_config_set_persists_and_masks_key() {
    let dir = tempdir().unwrap();
    configure(&dir, "http://localhost:7700");

    let json = robot_json(&mut searchpane(dir.path()), &["config", "show"]);
    assert_eq!(json["host"], "http://localhost:7700");
    assert_eq!(json["index"], "movies");
    assert_ne!(json["apiKey"], "masterKey");

    let json = robot_json(&mut searchpane(dir.path()), &["config", "show", "--reveal"]);
    assert_eq!(json["apiKey"], "masterKey");

    let saved = std::fs::read_to_string(dir.path().join("data/search-store.json")).unwrap();
    let blob: Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(blob["version"], 0);
    assert_eq!(blob["state"]["settings"]["index"], "movies");
}

#[test]
fn test_config_rejects_out_of_range_ratio() {
    let dir = tempdir().unwrap();
    let output = searchpane(dir.path())
        .args(["--robot", "config", "set", "--hybrid-ratio", "2"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"], true);
}

#[test]
fn test_config_reset_restores_defaults() {
    let dir = tempdir().unwrap();
    configure(&dir, "http://localhost:7700");
    searchpane(dir.path()).args(["config", "reset"]).assert().success();

    let json = robot_json(&mut searchpane(dir.path()), &["config", "show"]);
    assert_eq!(json["index"], "");
}

#[test]
fn test_config_path_points_into_storage_dir() {
    let dir = tempdir().unwrap();
    let json = robot_json(&mut searchpane(dir.path()), &["config", "path"]);
    let settings = json["settings"].as_str().unwrap();
    assert!(settings.starts_with(dir.path().join("data").to_str().unwrap()));
}

#[test]
fn test_share_link_roundtrip_between_stores() {
    let source = tempdir().unwrap();
    configure(&source, "http://localhost:7700");
    let json = robot_json(
        &mut searchpane(source.path()),
        &["share", "create", "--base", "http://demo.local/?tab=2#top"],
    );
    let link = json["link"].as_str().unwrap().to_string();
    assert!(link.contains("config="));

    let target = tempdir().unwrap();
    let json = robot_json(&mut searchpane(target.path()), &["share", "open", &link]);
    assert_eq!(json["applied"], true);
    assert_eq!(json["address"], "http://demo.local/?tab=2#top");

    let json = robot_json(&mut searchpane(target.path()), &["config", "show", "--reveal"]);
    assert_eq!(json["apiKey"], "masterKey");
    assert_eq!(json["titleAttr"], "title");
}

#[test]
fn test_share_open_malformed_link_changes_nothing() {
    let dir = tempdir().unwrap();
    let json = robot_json(
        &mut searchpane(dir.path()),
        &["share", "open", "http://demo.local/?config=%%%"],
    );
    assert_eq!(json["applied"], false);
    assert_eq!(json["address"], "http://demo.local/");
}

#[test]
fn test_search_without_settings_reports_missing_config() {
    let dir = tempdir().unwrap();
    let output = searchpane(dir.path())
        .args(["--robot", "search", "dune"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["code"], "CONFIG_MISSING_REQUIRED");
}

#[test]
fn test_search_against_engine() {
    let server = MockServer::start();
    mock_engine(&server);
    let dir = tempdir().unwrap();
    configure(&dir, &server.base_url());

    let json = robot_json(&mut searchpane(dir.path()), &["search", "dune"]);
    assert_eq!(json["count"], 1);
    assert_eq!(json["cards"][0]["title"], "Dune");
    assert_eq!(json["hybrid"], Value::Null);
}

#[test]
fn test_probe_against_engine() {
    let server = MockServer::start();
    mock_engine(&server);
    let dir = tempdir().unwrap();
    configure(&dir, &server.base_url());

    let json = robot_json(&mut searchpane(dir.path()), &["probe"]);
    assert_eq!(json["hostReachable"], true);
    assert_eq!(json["keyAuthorized"], true);
    assert_eq!(json["indexes"], json!(["movies"]));
    assert_eq!(json["embedders"], json!(["default"]));
    assert_eq!(json["fields"], json!(["id", "overview", "title"]));
}

#[test]
fn test_tui_refuses_robot_mode() {
    let dir = tempdir().unwrap();
    searchpane(dir.path())
        .args(["--robot", "tui"])
        .assert()
        .failure();
}
