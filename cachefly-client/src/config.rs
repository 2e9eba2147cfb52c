//! Client configuration

use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.cachefly.com/api/2.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_TOKEN_ENV: &str = "CACHEFLY_API_TOKEN";
pub const BASE_URL_ENV: &str = "CACHEFLY_BASE_URL";

#[derive(Clone)]
pub struct ClientConfig {
    pub api_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create ClientConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var(API_TOKEN_ENV)
            .map_err(|_| ClientError::MissingEnvVar(API_TOKEN_ENV.to_string()))?;

        let mut config = Self::new(api_token);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.is_empty()
        {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "API token must not be empty".to_string(),
            ));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ClientError::InvalidConfig(format!(
                "Base URL '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        Ok(())
    }
}
