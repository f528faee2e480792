use std::io::Write;

use twilight_feed::config::{ConfigError, FeedConfig};

mod support;
use support::{with_scoped_env, CLEAN_FEED_ENV};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_file() {
    let file = write_config(
        r#"
auth_token = "9f86d081884c7d65"
window_days = 120
update_interval_secs = 43200
year_cache_ttl_secs = 999999
"#,
    );
    let config = FeedConfig::from_file(file.path()).unwrap();
    assert_eq!(config.window_days, 120);
    assert!(config.token_configured());
    assert_eq!(config.year_cache_ttl().as_secs(), 43_200);
    assert_eq!(config.default_timezone, "America/Los_Angeles");
}

#[test]
fn test_from_file_reports_parse_errors() {
    let file = write_config("window_days = \"many\"");
    assert!(matches!(
        FeedConfig::from_file(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        FeedConfig::from_file(dir.path().join("absent.toml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_load_uses_feed_config_and_env_overrides() {
    let file = write_config("auth_token = \"from-file\"\nwindow_days = 30\n");
    let path = file.path().to_str().unwrap().to_string();

    let mut env = CLEAN_FEED_ENV.to_vec();
    env.push(("FEED_CONFIG", Some(path.as_str())));
    env.push(("FEED_AUTH_TOKEN", Some("from-env")));
    env.push(("FEED_DEFAULT_TIMEZONE", Some("Europe/Oslo")));

    let config = with_scoped_env(&env, FeedConfig::load).unwrap();
    assert_eq!(config.auth_token, "from-env");
    assert_eq!(config.window_days, 30);
    assert_eq!(config.default_tz(), chrono_tz::Europe::Oslo);
}

#[test]
fn test_load_rejects_bad_timezone() {
    let file = write_config("");
    let path = file.path().to_str().unwrap().to_string();

    let mut env = CLEAN_FEED_ENV.to_vec();
    env.push(("FEED_CONFIG", Some(path.as_str())));
    env.push(("FEED_DEFAULT_TIMEZONE", Some("Atlantis/Capital")));

    let result = with_scoped_env(&env, FeedConfig::load);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_load_rejects_non_numeric_override() {
    let file = write_config("");
    let path = file.path().to_str().unwrap().to_string();

    let mut env = CLEAN_FEED_ENV.to_vec();
    env.push(("FEED_CONFIG", Some(path.as_str())));
    env.push(("FEED_REQUEST_TIMEOUT", Some("soon")));

    assert!(with_scoped_env(&env, FeedConfig::load).is_err());
}
