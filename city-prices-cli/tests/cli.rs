use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;
use tempfile::TempDir;

/// Command with a clean environment: no API key and an empty config dir.
fn city_prices(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("city-prices").unwrap();
    cmd.env_remove("NUMBEO_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_dir.path().join("config.toml"));
    cmd
}

fn lookup(cmd: &mut Command, server: &MockServer) {
    cmd.args(["--city", "San Francisco, CA", "--country", "United States"])
        .args(["--base-url", &server.base_url()]);
}

fn sample_body() -> serde_json::Value {
    json!({
        "name": "San Francisco, CA",
        "country": "United States",
        "currency": "USD",
        "prices": [
            {
                "item_name": "Meal, Inexpensive Restaurant",
                "category_name": "Restaurants",
                "average_price": 25.0,
                "lowest_price": 15.0,
                "highest_price": 40.0,
                "data_points": 450
            }
        ]
    })
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("city-prices").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--city"))
        .stdout(predicate::str::contains("NUMBEO_API_KEY"));
}

#[test]
fn missing_api_key_exits_with_usage_error() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("API key is required"));

    mock.assert_hits(0);
}

#[test]
fn prints_report_for_city() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/city_prices")
            .query_param("city", "San Francisco, CA")
            .query_param("country", "United States")
            .query_param("api_key", "FLAGKEY");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "FLAGKEY"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("COST OF LIVING DATA: San Francisco, CA, United States"))
        .stdout(predicate::str::contains("Restaurants:"))
        .stdout(predicate::str::contains("  Meal, Inexpensive Restaurant\n"))
        .stdout(predicate::str::contains("    Average: $25.00\n"))
        .stdout(predicate::str::contains("    Range: $15.00 - $40.00\n"))
        .stdout(predicate::str::contains("    Data points: 450\n"));

    mock.assert();
}

#[test]
fn api_key_from_environment_is_used() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/city_prices").query_param("api_key", "ENVKEY");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.env("NUMBEO_API_KEY", "ENVKEY");
    cmd.assert().success();

    mock.assert();
}

#[test]
fn flag_api_key_takes_precedence_over_environment() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/city_prices").query_param("api_key", "FLAGKEY");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.env("NUMBEO_API_KEY", "ENVKEY").args(["--api-key", "FLAGKEY"]);
    cmd.assert().success();

    mock.assert();
}

#[test]
fn api_key_from_config_file_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "api_key = \"FILEKEY\"\n").unwrap();

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/city_prices").query_param("api_key", "FILEKEY");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.assert().success();

    mock.assert();
}

#[test]
fn unauthorized_exits_with_auth_code() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(401).body("invalid key");
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "WRONG"]);
    cmd.assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error: authentication failed"));
}

#[test]
fn unknown_city_exits_with_not_found_code() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200).json_body(json!({ "error": "City not found" }));
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "KEY"]);
    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains("error: no data found"));
}

#[test]
fn malformed_body_exits_with_parse_code() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200).body("{\"currency\": \"USD\", \"pri");
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "KEY"]);
    cmd.assert()
        .code(5)
        .stderr(predicate::str::contains("error: invalid response"));
}

#[test]
fn timeout_exits_with_network_code() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200)
            .json_body(sample_body())
            .delay(std::time::Duration::from_secs(4));
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "SECRET", "--timeout", "1"]);
    cmd.assert()
        .code(4)
        .stderr(predicate::str::contains("error: network error"))
        .stderr(predicate::str::contains("SECRET").not());
}

#[test]
fn empty_prices_prints_notice() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200).json_body(json!({ "currency": "USD", "prices": [] }));
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "KEY"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No price data available."))
        .stdout(predicate::str::contains("Average:").not());
}

#[test]
fn json_format_prints_machine_readable_report() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/city_prices");
        then.status(200).json_body(sample_body());
    });

    let mut cmd = city_prices(&dir);
    lookup(&mut cmd, &server);
    cmd.args(["--api-key", "KEY", "--format", "json"]);
    let output = cmd.output().unwrap();

    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["city"], "San Francisco, CA");
    assert_eq!(v["items"][0]["name"], "Meal, Inexpensive Restaurant");
    assert_eq!(v["items"][0]["average_price"], 25.0);
}
