//! End-to-end tests for `avgmove set-average-moving` against a mock Sheets API.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;

const ENV_VARS: &[&str] = &[
    "AVGMOVE_CONFIG",
    "AVGMOVE_SPREADSHEET_ID",
    "AVGMOVE_SHEET_NAME",
    "AVGMOVE_CREDENTIALS",
    "AVGMOVE_ACCESS_TOKEN",
    "AVGMOVE_SHEETS_API_BASE",
    "AVGMOVE_LOG",
];

struct Env {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Env {
    fn new(server: &MockServer) -> Self {
        Self::with_settings(json!({
            "sheets.apiBase": server.base_url(),
            "sheets.tokenUri": server.url("/token"),
        }))
    }

    fn with_settings(mut settings: serde_json::Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        settings["log.file"] = json!(dir.path().join("avgmove.log").to_string_lossy());
        let config = dir.path().join("settings.json");
        std::fs::write(&config, settings.to_string()).unwrap();
        Self { dir, config }
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("avgmove.log")
    }

    fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_avgmove"));
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.args(args)
            .arg("--config")
            .arg(&self.config)
            .output()
            .expect("failed to run avgmove")
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn mock_spreadsheet(server: &MockServer, sheet: &str, values: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sid")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(json!({ "spreadsheetId": "sid" }));
    });
    let path = format!("/v4/spreadsheets/sid/values/{}", sheet);
    server.mock(move |when, then| {
        when.method(GET)
            .path(path)
            .query_param("valueRenderOption", "UNFORMATTED_VALUE");
        then.status(200).json_body(json!({ "majorDimension": "ROWS", "values": values }));
    });
}

#[test]
fn test_creates_column_and_prints_done() {
    let server = MockServer::start();
    mock_spreadsheet(
        &server,
        "testSheet",
        json!([["Date", "Visitors"], ["2023-01-01", 10], ["2023-01-02", 15], ["2023-01-03", 20]]),
    );
    let header = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sid/values/testSheet!C1")
            .query_param("valueInputOption", "RAW")
            .json_body(json!({
                "range": "testSheet!C1",
                "majorDimension": "ROWS",
                "values": [["Average Moving"]]
            }));
        then.status(200).json_body(json!({ "updatedCells": 1 }));
    });
    let data = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sid/values/testSheet!C2:C4")
            .json_body(json!({
                "range": "testSheet!C2:C4",
                "majorDimension": "ROWS",
                "values": [[10], [5], [5]]
            }));
        then.status(200).json_body(json!({ "updatedCells": 3 }));
    });

    let env = Env::new(&server);
    let out = env.run(&[
        "set-average-moving",
        "--spreadsheet-id",
        "sid",
        "--sheet-name",
        "testSheet",
        "--access-token",
        "tok",
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "Done!");
    assert!(stderr(&out).contains("wrote 3 values to testSheet!C2:C4 (created column C)"));
    header.assert();
    data.assert();
}

#[test]
fn test_existing_column_is_overwritten_in_place() {
    let server = MockServer::start();
    mock_spreadsheet(
        &server,
        "testSheet",
        json!([
            ["Date", "Average Moving", "Visitors"],
            ["2023-01-01", "", 10],
            ["2023-01-02", "", 15]
        ]),
    );
    let header = server.mock(|when, then| {
        when.method(PUT).path("/v4/spreadsheets/sid/values/testSheet!B1");
        then.status(200).json_body(json!({}));
    });
    let data = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sid/values/testSheet!B2:B3")
            .json_body(json!({
                "range": "testSheet!B2:B3",
                "majorDimension": "ROWS",
                "values": [[10], [5]]
            }));
        then.status(200).json_body(json!({ "updatedCells": 2 }));
    });

    let env = Env::new(&server);
    let out = env.run(&[
        "set-average-moving",
        "--spreadsheetId",
        "sid",
        "--sheetName",
        "testSheet",
        "--access-token",
        "tok",
        "--quiet",
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "Done!");
    assert!(!stderr(&out).contains("wrote"));
    header.assert_calls(0);
    data.assert();
}

#[test]
fn test_missing_column_fails_without_writing() {
    let server = MockServer::start();
    mock_spreadsheet(
        &server,
        "testSheet",
        json!([["Date", "Visits"], ["2023-01-01", 10], ["2023-01-02", 15]]),
    );
    let any_put = server.mock(|when, then| {
        when.method(PUT);
        then.status(200).json_body(json!({}));
    });

    let env = Env::new(&server);
    let out = env.run(&[
        "set-average-moving",
        "--spreadsheet-id",
        "sid",
        "--sheet-name",
        "testSheet",
        "--access-token",
        "tok",
    ]);

    assert_eq!(out.status.code(), Some(61));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("error: Visitors column not found!"));
    assert!(stderr(&out).contains("hint:"));
    any_put.assert_calls(0);

    let log = std::fs::read_to_string(env.log_path()).unwrap();
    assert!(log.contains("ERROR"));
    assert!(log.contains("Visitors column not found!"));
}

#[test]
fn test_insufficient_data() {
    let server = MockServer::start();
    mock_spreadsheet(&server, "testSheet", json!([["Date", "Visitors"], ["2023-01-01", 10]]));

    let env = Env::new(&server);
    let out = env.run(&[
        "set-average-moving",
        "--spreadsheet-id",
        "sid",
        "--sheet-name",
        "testSheet",
        "--access-token",
        "tok",
    ]);

    assert_eq!(out.status.code(), Some(60));
    assert!(stderr(&out).contains("No necessary data found!"));
}

#[test]
fn test_unknown_spreadsheet() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/nope");
        then.status(404).json_body(json!({
            "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" }
        }));
    });

    let env = Env::new(&server);
    let out = env.run(&["set-average-moving", "--spreadsheet-id", "nope", "--access-token", "tok"]);

    assert_eq!(out.status.code(), Some(53));
    assert!(stderr(&out).contains("Something went wrong when trying to get the Spreadsheet!"));
    assert!(stderr(&out).contains("Requested entity was not found."));
}

#[test]
fn test_settings_and_env_supply_inputs() {
    let server = MockServer::start();
    mock_spreadsheet(
        &server,
        "Traffic",
        json!([["Date", "Visitors"], ["2023-01-01", 3], ["2023-01-02", 1]]),
    );
    let data = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sid/values/Traffic!C2:C3")
            .json_body(json!({
                "range": "Traffic!C2:C3",
                "majorDimension": "ROWS",
                "values": [[3], [-2]]
            }));
        then.status(200).json_body(json!({}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/v4/spreadsheets/sid/values/Traffic!C1");
        then.status(200).json_body(json!({}));
    });

    let env = Env::with_settings(json!({
        "sheets.spreadsheetId": "sid",
        "sheets.sheetName": "Traffic",
        "sheets.apiBase": "http://127.0.0.1:9",
    }));

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_avgmove"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    let out = cmd
        .args(["set-average-moving", "--config"])
        .arg(&env.config)
        .env("AVGMOVE_SHEETS_API_BASE", server.base_url())
        .env("AVGMOVE_ACCESS_TOKEN", "tok")
        .output()
        .expect("failed to run avgmove");

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    data.assert();
}

#[test]
fn test_refreshes_token_from_credentials_file() {
    let server = MockServer::start();
    let token = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3599 }));
    });
    mock_spreadsheet(
        &server,
        "Sheet1",
        json!([["Date", "Visitors", "Average Moving"], ["d1", 7], ["d2", 9]]),
    );
    let data = server.mock(|when, then| {
        when.method(PUT).path("/v4/spreadsheets/sid/values/Sheet1!C2:C3");
        then.status(200).json_body(json!({}));
    });

    let env = Env::new(&server);
    let creds = env.dir.path().join("credentials.json");
    write_credentials(&creds);

    let out = env.run(&[
        "set-average-moving",
        "--spreadsheet-id",
        "sid",
        "--credentials",
        creds.to_str().unwrap(),
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    token.assert_calls(1);
    data.assert();
}

#[test]
fn test_service_account_key_is_exchanged_for_token() {
    let server = MockServer::start();
    let token = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .form_urlencoded_tuple("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer")
            .form_urlencoded_tuple_exists("assertion");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3599 }));
    });
    mock_spreadsheet(
        &server,
        "Sheet1",
        json!([["Date", "Visitors"], ["d1", 4], ["d2", 6]]),
    );
    let header = server.mock(|when, then| {
        when.method(PUT).path("/v4/spreadsheets/sid/values/Sheet1!C1");
        then.status(200).json_body(json!({}));
    });
    let data = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sid/values/Sheet1!C2:C3")
            .json_body(json!({
                "range": "Sheet1!C2:C3",
                "majorDimension": "ROWS",
                "values": [[4], [2]]
            }));
        then.status(200).json_body(json!({}));
    });

    let env = Env::new(&server);
    let key = env.dir.path().join("service-account.json");
    let body = json!({
        "type": "service_account",
        "project_id": "project",
        "private_key_id": "kid-1",
        "private_key": include_str!("../../sheets_client/tests/fixtures/test_sa_key.pem"),
        "client_email": "bot@project.iam.gserviceaccount.com"
    });
    std::fs::write(&key, body.to_string()).unwrap();

    let out = env.run(&[
        "set-average-moving",
        "--spreadsheet-id",
        "sid",
        "--credentials",
        key.to_str().unwrap(),
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "Done!");
    token.assert_calls(1);
    header.assert();
    data.assert();
}

fn write_credentials(path: &Path) {
    let body = json!({
        "type": "authorized_user",
        "client_id": "cid",
        "client_secret": "csec",
        "refresh_token": "rt"
    });
    std::fs::write(path, body.to_string()).unwrap();
}

#[test]
fn test_missing_credentials() {
    let server = MockServer::start();
    let env = Env::with_settings(json!({
        "sheets.apiBase": server.base_url(),
        "sheets.credentialsPath": "/tmp/nonexistent-avgmove-creds.json",
    }));

    let out = env.run(&["set-average-moving", "--spreadsheet-id", "sid"]);

    assert_eq!(out.status.code(), Some(50));
    assert!(stderr(&out).contains("cannot read credentials file"));
    assert!(stderr(&out).contains("hint:"));
}

#[test]
fn test_missing_spreadsheet_id() {
    let server = MockServer::start();
    let env = Env::new(&server);

    let out = env.run(&["set-average-moving", "--access-token", "tok"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("missing spreadsheet id"));
}

#[test]
fn test_malformed_explicit_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("settings.json");
    std::fs::write(&config, "{ not json").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_avgmove"))
        .args(["set-average-moving", "--spreadsheet-id", "sid", "--access-token", "tok", "--config"])
        .arg(&config)
        .output()
        .expect("failed to run avgmove");

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("error: invalid settings file"));
    // Logged even though the configured log file was never read
    assert!(stderr(&out).contains("ERROR avgmove: invalid settings file"), "stderr: {}", stderr(&out));
}

#[test]
fn test_init_config_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested/settings.json");

    let out = Command::new(env!("CARGO_BIN_EXE_avgmove"))
        .arg("init-config")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("failed to run avgmove");

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), config.to_string_lossy());
    let contents = std::fs::read_to_string(&config).unwrap();
    assert!(contents.contains("\"sheets.sheetName\": \"Sheet1\""));

    // Second run leaves the file alone
    std::fs::write(&config, "{}").unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_avgmove"))
        .arg("init-config")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("failed to run avgmove");
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "{}");
}
