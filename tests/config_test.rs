//! Tests for configuration loading from files and the environment

use std::io::Write;

use serial_test::serial;
use trendcast::config::Config;

const ENV_VARS: &[&str] = &[
    "TRENDCAST_SOURCE_URL",
    "TRENDCAST_SOURCE_PER_PAGE",
    "TRENDCAST_STORAGE_URL",
    "TRENDCAST_STORAGE_AUTH",
    "TRENDCAST_STORAGE_SET_KEY",
    "TRENDCAST_WEBHOOK_URL",
    "TRENDCAST_CHAR_BUDGET",
    "TRENDCAST_POLL_INTERVAL",
    "TRENDCAST_MAX_SCOPE",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.source.base_url, "https://gitlab.com");
    assert_eq!(config.storage.url, "redis://localhost:6379");
    assert_eq!(config.storage.set_key, "announced-projects");
    assert_eq!(config.composer.char_budget, 140);
    assert_eq!(config.scheduler.poll_interval_secs, 3600);
    assert_eq!(config.scheduler.max_scope, 5);
    assert_eq!(config.publisher.default_short_url_width, 23);
    assert!(config.publisher.webhook_url.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("TRENDCAST_POLL_INTERVAL", "600");
    std::env::set_var("TRENDCAST_MAX_SCOPE", "3");
    std::env::set_var("TRENDCAST_STORAGE_URL", "redis://cache.internal:6379");
    std::env::set_var("TRENDCAST_STORAGE_AUTH", "sekrit");
    std::env::set_var("TRENDCAST_WEBHOOK_URL", "https://hooks.example.com/announce");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.scheduler.poll_interval_secs, 600);
    assert_eq!(config.scheduler.max_scope, 3);
    assert_eq!(config.storage.url, "redis://cache.internal:6379");
    assert_eq!(config.storage.password.as_deref(), Some("sekrit"));
    assert_eq!(
        config.publisher.webhook_url.as_deref(),
        Some("https://hooks.example.com/announce")
    );

    let with_auth = config.storage.connection_url().unwrap();
    assert!(with_auth.contains("sekrit"));
}

#[test]
#[serial]
fn test_unparsable_env_value_falls_back_to_default() {
    clear_env();
    std::env::set_var("TRENDCAST_POLL_INTERVAL", "not-a-number");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.scheduler.poll_interval_secs, 3600);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[source]
base_url = "https://gitlab.example.com"
per_page = 50
requests_per_second = 5
request_timeout_secs = 15

[storage]
url = "redis://cache.internal:6379"
pool_size = 4
set_key = "announced"

[publisher]
webhook_url = "https://hooks.example.com/announce"
timeout_secs = 10
default_short_url_width = 24

[composer]
char_budget = 140

[scheduler]
poll_interval_secs = 1800
config_refresh_secs = 43200
max_scope = 4

[logging]
level = "debug"
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.source.base_url, "https://gitlab.example.com");
    assert_eq!(config.source.per_page, 50);
    assert_eq!(config.storage.pool_size, 4);
    assert_eq!(config.storage.set_key, "announced");
    assert!(config.storage.password.is_none());
    assert_eq!(config.publisher.default_short_url_width, 24);
    assert_eq!(config.scheduler.poll_interval_secs, 1800);
    assert_eq!(config.scheduler.max_scope, 4);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_from_file_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "this is not toml [").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_missing_file_errors() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/trendcast.toml"));
    assert!(result.is_err());
}
