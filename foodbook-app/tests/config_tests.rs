//! Client settings resolution tests
//!
//! Tests that touch FOODBOOK_* environment variables are #[serial] so they
//! never race each other.

use foodbook_app::config::{
    resolve_api_base_url, resolve_suggestion_api_key, ClientSettings, API_URL_ENV,
    DEFAULT_API_BASE_URL, SUGGESTION_API_KEY_ENV,
};
use foodbook_common::config::{SuggestionConfig, TomlConfig};
use serial_test::serial;
use std::time::Duration;

fn toml_with_url(url: &str) -> TomlConfig {
    TomlConfig {
        api_base_url: Some(url.to_string()),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_cli_url_overrides_env_and_toml() {
    std::env::set_var(API_URL_ENV, "http://env:1");
    let url = resolve_api_base_url(Some("http://cli:1"), &toml_with_url("http://toml:1"));
    assert_eq!(url, "http://cli:1");
    std::env::remove_var(API_URL_ENV);
}

#[test]
#[serial]
fn test_env_url_overrides_toml() {
    std::env::set_var(API_URL_ENV, "http://env:1/");
    let url = resolve_api_base_url(None, &toml_with_url("http://toml:1"));
    assert_eq!(url, "http://env:1");
    std::env::remove_var(API_URL_ENV);
}

#[test]
#[serial]
fn test_toml_url_then_default() {
    std::env::remove_var(API_URL_ENV);
    assert_eq!(resolve_api_base_url(None, &toml_with_url("http://toml:1")), "http://toml:1");
    assert_eq!(resolve_api_base_url(None, &TomlConfig::default()), DEFAULT_API_BASE_URL);
}

#[test]
#[serial]
fn test_blank_env_url_is_ignored() {
    std::env::set_var(API_URL_ENV, "   ");
    assert_eq!(resolve_api_base_url(None, &TomlConfig::default()), DEFAULT_API_BASE_URL);
    std::env::remove_var(API_URL_ENV);
}

#[test]
#[serial]
fn test_suggestion_key_env_wins_over_toml() {
    std::env::set_var(SUGGESTION_API_KEY_ENV, "env-key");
    let toml = TomlConfig {
        suggestions: SuggestionConfig {
            api_key: Some("toml-key".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    assert_eq!(resolve_suggestion_api_key(&toml).as_deref(), Some("env-key"));

    std::env::remove_var(SUGGESTION_API_KEY_ENV);
    assert_eq!(resolve_suggestion_api_key(&toml).as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_suggestion_key_optional() {
    std::env::remove_var(SUGGESTION_API_KEY_ENV);
    assert_eq!(resolve_suggestion_api_key(&TomlConfig::default()), None);
}

#[test]
#[serial]
fn test_resolve_defaults() {
    std::env::remove_var(API_URL_ENV);
    std::env::remove_var(SUGGESTION_API_KEY_ENV);

    let settings = ClientSettings::resolve(None, None, &TomlConfig::default());
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.request_timeout, Duration::from_secs(120));
}

#[test]
#[serial]
fn test_resolve_from_toml_file() {
    std::env::remove_var(API_URL_ENV);
    std::env::remove_var(SUGGESTION_API_KEY_ENV);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
api_base_url = "http://localhost:8080"
request_timeout_secs = 30

[suggestions]
api_key = "from-file"
"#,
    )
    .unwrap();

    let toml = TomlConfig::load(&path).unwrap();
    let settings = ClientSettings::resolve(None, None, &toml);
    assert_eq!(settings.api_base_url, "http://localhost:8080");
    assert_eq!(settings.request_timeout, Duration::from_secs(30));
    assert_eq!(settings.suggestion.api_key.as_deref(), Some("from-file"));
}
