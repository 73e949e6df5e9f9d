//! Integration tests for the `breezly` CLI binary.
//!
//! Argument parsing, help output and error exits run without any API.
//! The data-path tests point `--base-url` at a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `breezly` with every BREEZEWAY_* / BREEZLY_* variable cleared and the
/// config directory pointed at a nonexistent path.
fn breezly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("breezly");
    cmd.env("HOME", "/tmp/breezly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/breezly-cli-test-nonexistent")
        .env_remove("BREEZLY_PROFILE")
        .env_remove("BREEZLY_OUTPUT")
        .env_remove("BREEZLY_TIMEOUT")
        .env_remove("BREEZEWAY_BASE_URL")
        .env_remove("BREEZEWAY_API_KEY")
        .env_remove("BREEZEWAY_API_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// `breezly` with credentials, talking to `base_url`.
fn authed_cmd(base_url: &str) -> assert_cmd::Command {
    let mut cmd = breezly_cmd();
    cmd.args(["--base-url", base_url])
        .env("BREEZEWAY_API_KEY", "cli-client")
        .env("BREEZEWAY_API_SECRET", "cli-secret");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/auth/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cli-token",
            "refresh_token": "cli-refresh"
        })))
        .mount(&server)
        .await;
    server
}

/// Run a blocking assert_cmd invocation off the async runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = breezly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    breezly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("properties")
            .and(predicate::str::contains("tasks"))
            .and(predicate::str::contains("reservations"))
            .and(predicate::str::contains("search"))
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("mcp")),
    );
}

#[test]
fn version_flag() {
    breezly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("breezly"));
}

#[test]
fn properties_subcommands_exist() {
    breezly_cmd()
        .args(["properties", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("find"))
                .and(predicate::str::contains("count"))
                .and(predicate::str::contains("wifi"))
                .and(predicate::str::contains("update")),
        );
}

#[test]
fn completions_zsh() {
    breezly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn invalid_output_format() {
    let output = breezly_cmd()
        .args(["--output", "xml", "properties", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn missing_credentials_exit_with_auth_code() {
    breezly_cmd()
        .args(["properties", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No credentials"));
}

#[test]
fn unknown_fetch_kind_is_a_usage_error() {
    // Kind parsing fails before any request, so the unreachable port is never hit.
    authed_cmd("http://127.0.0.1:9")
        .args(["fetch", "guest", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("guest"));
}

#[test]
fn update_without_fields_is_a_usage_error() {
    authed_cmd("http://127.0.0.1:9")
        .args(["properties", "update", "42"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to change"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_show_without_a_file_renders_defaults() {
    breezly_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.breezeway.io"));
}

#[test]
fn config_path_points_at_toml() {
    breezly_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

/// Write `contents` as the config file under a temp XDG config home.
fn config_home(contents: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("breezly");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), contents).unwrap();
    dir
}

#[test]
fn config_show_masks_plaintext_secret() {
    let home = config_home(
        r#"
default_profile = "work"

[profiles.work]
client_id = "work-client"
client_secret = "plaintext-secret"
"#,
    );

    breezly_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("work-client")
                .and(predicate::str::contains("plaintext-secret").not()),
        );
}

// ── Against a mock API ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn profile_from_config_file_is_used() {
    let server = mock_api().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/reservation"))
        .and(wiremock::matchers::query_param("property_id", "77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 900, "property_id": 77, "check_in": "2025-07-01" }]
        })))
        .mount(&server)
        .await;

    let home = config_home(&format!(
        r#"
default_profile = "mock"

[profiles.mock]
base_url = "{}"
client_id = "file-client"
client_secret = "file-secret"
"#,
        server.uri()
    ));

    let mut cmd = breezly_cmd();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .args(["-o", "plain", "reservations", "list", "--property-id", "77"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "900");
}

#[tokio::test(flavor = "multi_thread")]
async fn properties_list_plain_prints_ids() {
    let server = mock_api().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 11, "name": "Beach House", "status": "active" },
                { "id": 12, "name": "Lake Cabin", "status": "inactive" },
                { "id": 13, "name": "Mountain Loft", "status": "active" }
            ]
        })))
        .mount(&server)
        .await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["-o", "plain", "properties", "list", "--offset", "1", "--limit", "1"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "12");
}

#[tokio::test(flavor = "multi_thread")]
async fn properties_count_json_breaks_down_status() {
    let server = mock_api().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 1, "status": "active" },
                { "id": 2, "status": "active" },
                { "id": 3 }
            ]
        })))
        .mount(&server)
        .await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["-o", "json-compact", "properties", "count"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["by_status"]["active"], 2);
    assert_eq!(body["by_status"]["unknown"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_property_exits_not_found() {
    let server = mock_api().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["properties", "get", "999"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("'999' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_exit_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/auth/v1/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .mount(&server)
        .await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["auth", "check"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_check_reports_client_id() {
    let server = mock_api().await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["-o", "plain", "auth", "check"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "cli-client");
}

#[tokio::test(flavor = "multi_thread")]
async fn search_table_shows_hits_across_kinds() {
    let server = mock_api().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 5, "name": "Ocean View", "address1": "1 Shore Rd" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/task/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 6, "title": "Clean ocean-facing deck", "status": "open" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/reservation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let mut cmd = authed_cmd(&server.uri());
    cmd.args(["-o", "plain", "search", "OCEAN"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "property:5\ntask:6");
}
