use std::io::Write;
use std::time::Duration;

use oddsync::error::{ConfigError, Error};
use oddsync::infrastructure::config::logging::LogFormat;
use oddsync::infrastructure::config::settings::Config;
use oddsync::testkit::config::toml_with_api;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn config_loads_from_file() {
    let file = write_temp_config(&toml_with_api("https://api.example.com/v1"));

    let config = assert_ok!(Config::load(file.path()));

    assert_eq!(config.ledger.pool_api_url, "https://api.example.com/v1");
    assert_eq!(config.ledger.indexer_url, "https://api.example.com/v1");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.sync.poll_interval_ms, 10_000);
    assert_eq!(config.display.unit_symbol, "ALEO");
}

#[test]
fn config_sync_section_maps_to_service_config() {
    let file = write_temp_config(
        r#"
[sync]
poll_interval_ms = 2500
update_channel_capacity = 8
"#,
    );

    let config = assert_ok!(Config::load(file.path()));
    let sync = config.sync.pool_sync();

    assert_eq!(sync.poll_interval, Duration::from_millis(2500));
    assert_eq!(sync.update_channel_capacity, 8);
}

#[test]
fn config_http_settings_are_flattened_into_ledger() {
    let file = write_temp_config(
        r#"
[ledger]
pool_api_url = "http://127.0.0.1:3001/api"
indexer_url = "http://127.0.0.1:3002"
timeout_ms = 1500
retry_max_attempts = 5
"#,
    );

    let config = assert_ok!(Config::load(file.path()));

    assert_eq!(config.ledger.http.timeout_ms, 1500);
    assert_eq!(config.ledger.http.retry_max_attempts, 5);
    assert_eq!(config.ledger.http.connect_timeout_ms, 5000);
}

#[test]
fn config_missing_file_is_an_error_for_load() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.toml");

    let result = Config::load(&path);

    assert!(
        matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))),
        "Expected ReadFile error for missing config"
    );
}

#[test]
fn config_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.toml");

    let config = assert_ok!(Config::load_or_default(&path));

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.sync.update_channel_capacity, 256);
}

#[test]
fn config_rejects_zero_poll_interval() {
    let file = write_temp_config(
        r#"
[sync]
poll_interval_ms = 0
"#,
    );

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "poll_interval_ms",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid poll interval error, got {err}"),
        Ok(config) => panic!(
            "Expected zero poll interval to be rejected, got {}",
            config.sync.poll_interval_ms
        ),
    }
}

#[test]
fn config_rejects_non_http_endpoint() {
    let file = write_temp_config(&toml_with_api("ftp://ledger.example.com"));

    let err = assert_err!(Config::load(file.path()));

    assert!(
        matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "pool_api_url",
                ..
            })
        ),
        "Expected invalid scheme error, got {err}"
    );
}

#[test]
fn config_reports_malformed_toml() {
    let file = write_temp_config("[sync\npoll_interval_ms = ");

    let err = assert_err!(Config::load_or_default(file.path()));

    assert!(
        matches!(err, Error::Config(ConfigError::Parse(_))),
        "Expected parse error, got {err}"
    );
}
