//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the backend API
//!
//! ## Optional
//! - `STOREFRONT_STATES_URL` - Region reference-data endpoint
//!   (default: `<STOREFRONT_API_URL>/api/states`)
//! - `STOREFRONT_COOKIE_FILE` - Path of the persisted auth cookie
//!   (default: `.jacaranda-cookie`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend API (no trailing slash)
    pub api_url: String,
    /// Region reference-data endpoint
    pub states_url: String,
    /// Path of the persisted auth cookie
    pub cookie_file: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STOREFRONT_API_URL` is missing or not a
    /// valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("STOREFRONT_API_URL")?;
        let api_url = validate_base_url("STOREFRONT_API_URL", &api_url)?;

        let states_url = match get_optional_env("STOREFRONT_STATES_URL") {
            Some(url) => validate_base_url("STOREFRONT_STATES_URL", &url)?,
            None => format!("{api_url}/api/states"),
        };

        let cookie_file =
            PathBuf::from(get_env_or_default("STOREFRONT_COOKIE_FILE", ".jacaranda-cookie"));

        Ok(Self {
            api_url,
            states_url,
            cookie_file,
        })
    }

    /// Build a configuration directly, normalizing the URLs.
    ///
    /// Used by tests and embedders that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either URL is not a valid absolute URL.
    pub fn new(
        api_url: &str,
        states_url: Option<&str>,
        cookie_file: PathBuf,
    ) -> Result<Self, ConfigError> {
        let api_url = validate_base_url("api_url", api_url)?;
        let states_url = match states_url {
            Some(url) => validate_base_url("states_url", url)?,
            None => format!("{api_url}/api/states"),
        };
        Ok(Self {
            api_url,
            states_url,
            cookie_file,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate an absolute URL and strip any trailing slash.
fn validate_base_url(name: &str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url_strips_trailing_slash() {
        let url = validate_base_url("TEST", "http://localhost:4000/").unwrap();
        assert_eq!(url, "http://localhost:4000");
    }

    #[test]
    fn test_validate_base_url_rejects_garbage() {
        let err = validate_base_url("TEST", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "TEST"));
    }

    #[test]
    fn test_new_derives_states_url() {
        let config =
            StorefrontConfig::new("http://localhost:4000", None, PathBuf::from("/tmp/cookie"))
                .unwrap();
        assert_eq!(config.states_url, "http://localhost:4000/api/states");
    }

    #[test]
    fn test_new_respects_explicit_states_url() {
        let config = StorefrontConfig::new(
            "http://localhost:4000",
            Some("http://localhost:5000/states/"),
            PathBuf::from("/tmp/cookie"),
        )
        .unwrap();
        assert_eq!(config.states_url, "http://localhost:5000/states");
    }
}
