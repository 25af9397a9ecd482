//! Client configuration, read once at startup.

use reqwest::Url;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "SENTINAI_API_URL";
/// Environment variable overriding the sign-in view path.
pub const SIGN_IN_PATH_ENV: &str = "SENTINAI_SIGN_IN_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SIGN_IN_PATH: &str = "/login";
pub const DEFAULT_AFTER_LOGIN_PATH: &str = "/dashboard";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

/// Process-wide client configuration.
///
/// Passed explicitly to [`crate::ApiClient`]; nothing reads the environment
/// after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_url: String,
    sign_in_path: String,
    after_login_path: String,
}

impl ClientConfig {
    /// Build a config for the given base URL with default view paths.
    pub fn new(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = api_url.into();
        let parsed = Url::parse(&raw).map_err(|e| ConfigError::InvalidApiUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: raw,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            api_url: raw.trim_end_matches('/').to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            after_login_path: DEFAULT_AFTER_LOGIN_PATH.to_string(),
        })
    }

    /// Read `SENTINAI_API_URL` and `SENTINAI_SIGN_IN_PATH`, with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url)?;
        if let Ok(path) = std::env::var(SIGN_IN_PATH_ENV) {
            config = config.with_sign_in_path(path);
        }
        Ok(config)
    }

    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn after_login_path(&self) -> &str {
        &self.after_login_path
    }

    /// `<base url><path>`; paths are always relative to the configured root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
