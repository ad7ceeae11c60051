//! Client configuration.

use crate::error::{ApiError, Result};

/// Production endpoint of the Actions API.
pub const DEFAULT_BASE_URL: &str = "https://api.altan.ai";

/// Used when `ACTIONS_API_KEY` is not set, so the client can still be built
/// and the service answers with an authentication error.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key";

pub const API_KEY_ENV: &str = "ACTIONS_API_KEY";
pub const BASE_URL_ENV: &str = "ACTIONS_BASE_URL";

/// Credentials and endpoint for an `ActionsClient`.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACTIONS_API_KEY`: API key (default: a placeholder)
    /// - `ACTIONS_BASE_URL`: API root (default: the production endpoint)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV).unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string());
        let base_url = match lookup(BASE_URL_ENV) {
            Some(url) if url.trim().is_empty() => {
                return Err(ApiError::Config(format!("{BASE_URL_ENV} is set but empty")));
            }
            Some(url) => url,
            None => DEFAULT_BASE_URL.to_string(),
        };
        Ok(Self { api_key, base_url })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_key, PLACEHOLDER_API_KEY);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn reads_both_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-live"),
            (BASE_URL_ENV, "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "sk-live");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn debug_hides_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
