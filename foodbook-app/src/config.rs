//! Client settings resolution for foodbook-app
//!
//! Outbound service settings are resolved once at startup with priority
//! CLI → ENV → TOML → compiled default. The suggestion API key has no CLI
//! source and is optional; requests go out without it when none is set.

use foodbook_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the extraction API base URL
pub const API_URL_ENV: &str = "FOODBOOK_API_URL";

/// Environment variable holding the suggestion service key
pub const SUGGESTION_API_KEY_ENV: &str = "FOODBOOK_SUGGESTION_API_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://recipe-api-pqbr.onrender.com";
pub const DEFAULT_SUGGESTION_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_SUGGESTION_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_SUGGESTION_MAX_TOKENS: u32 = 2000;

/// Extraction can take a while on a cold service
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Settings for the two outbound services
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Extraction API base, without trailing slash
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub suggestion: SuggestionSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionSettings {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key: Option<String>,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SUGGESTION_ENDPOINT.to_string(),
            model: DEFAULT_SUGGESTION_MODEL.to_string(),
            max_tokens: DEFAULT_SUGGESTION_MAX_TOKENS,
            api_key: None,
        }
    }
}

impl ClientSettings {
    /// Resolve settings from command-line overrides, environment and TOML
    pub fn resolve(
        cli_api_url: Option<&str>,
        cli_timeout_secs: Option<u64>,
        toml_config: &TomlConfig,
    ) -> Self {
        let api_base_url = resolve_api_base_url(cli_api_url, toml_config);

        let timeout_secs = cli_timeout_secs
            .or(toml_config.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let suggestions = &toml_config.suggestions;
        let suggestion = SuggestionSettings {
            endpoint: suggestions
                .endpoint
                .clone()
                .filter(|e| is_valid_value(e))
                .unwrap_or_else(|| DEFAULT_SUGGESTION_ENDPOINT.to_string()),
            model: suggestions
                .model
                .clone()
                .filter(|m| is_valid_value(m))
                .unwrap_or_else(|| DEFAULT_SUGGESTION_MODEL.to_string()),
            max_tokens: suggestions
                .max_tokens
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_SUGGESTION_MAX_TOKENS),
            api_key: resolve_suggestion_api_key(toml_config),
        };

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            suggestion,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            suggestion: SuggestionSettings::default(),
        }
    }
}

/// Extraction API base URL
///
/// **Priority:** CLI → ENV → TOML → default
pub fn resolve_api_base_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> String {
    let env_value = std::env::var(API_URL_ENV).ok();

    let url = cli_arg
        .filter(|u| is_valid_value(u))
        .map(str::to_string)
        .or_else(|| env_value.filter(|u| is_valid_value(u)))
        .or_else(|| toml_config.api_base_url.clone().filter(|u| is_valid_value(u)))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    url.trim().trim_end_matches('/').to_string()
}

/// Suggestion service key
///
/// **Priority:** ENV → TOML
pub fn resolve_suggestion_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(SUGGESTION_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_value(k));
    let toml_key = toml_config
        .suggestions
        .api_key
        .clone()
        .filter(|k| is_valid_value(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Suggestion API key found in multiple sources: environment, TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Suggestion API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Suggestion API key loaded from TOML config");
        return Some(key);
    }

    None
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_value() {
        assert!(is_valid_value("key"));
        assert!(!is_valid_value(""));
        assert!(!is_valid_value("   "));
    }

    #[test]
    fn test_suggestion_defaults() {
        let settings = SuggestionSettings::default();
        assert_eq!(settings.endpoint, DEFAULT_SUGGESTION_ENDPOINT);
        assert_eq!(settings.model, "claude-sonnet-4-20250514");
        assert_eq!(settings.max_tokens, 2000);
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_cli_url_trailing_slash_trimmed() {
        let toml = TomlConfig::default();
        assert_eq!(
            resolve_api_base_url(Some("http://localhost:3000/"), &toml),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let toml = TomlConfig {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        let settings = ClientSettings::resolve(Some("http://x"), None, &toml);
        assert_eq!(settings.request_timeout, Duration::from_secs(120));

        let settings = ClientSettings::resolve(Some("http://x"), Some(5), &toml);
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_toml_suggestion_overrides() {
        let mut toml = TomlConfig::default();
        toml.suggestions.model = Some("other-model".to_string());
        toml.suggestions.max_tokens = Some(500);
        toml.suggestions.endpoint = Some("  ".to_string());

        let settings = ClientSettings::resolve(Some("http://x"), None, &toml);
        assert_eq!(settings.suggestion.model, "other-model");
        assert_eq!(settings.suggestion.max_tokens, 500);
        assert_eq!(settings.suggestion.endpoint, DEFAULT_SUGGESTION_ENDPOINT);
    }
}
