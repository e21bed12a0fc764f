//! Tests for configuration loading.
use flowdraft::config::Config;
use flowdraft::error::ConfigError;
use flowdraft::validator::DEFAULT_DEBOUNCE;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.server_url, "http://localhost:8080");
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.validation_debounce(), Duration::from_millis(500));
    assert_eq!(config.validation_debounce(), DEFAULT_DEBOUNCE);
}

#[test]
fn test_overrides_replace_only_set_values() {
    let config = Config::default()
        .with_overrides(|name| match name {
            "FLOWDRAFT_SERVER_URL" => Some("https://flows.example.com".to_string()),
            "FLOWDRAFT_VALIDATION_DEBOUNCE_MS" => Some(" 250 ".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.server_url, "https://flows.example.com");
    assert_eq!(config.validation_debounce_ms, 250);
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn test_invalid_number_names_the_variable() {
    let result = Config::default().with_overrides(|name| {
        (name == "FLOWDRAFT_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
    });
    match result {
        Err(ConfigError::InvalidEnv { name, value }) => {
            assert_eq!(name, "FLOWDRAFT_REQUEST_TIMEOUT_SECS");
            assert_eq!(value, "soon");
        }
        other => panic!("Expected InvalidEnv, got {:?}", other),
    }
}

#[test]
fn test_file_fills_missing_keys_with_defaults() {
    let path = std::env::temp_dir().join(format!("flowdraft-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "request_timeout_secs": 5 }"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.server_url, "http://localhost:8080");

    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Io { .. })
    ));
}
