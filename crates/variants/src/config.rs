//! Client configuration loaded from the environment.

use std::time::Duration;

use gridstudy_observability::LogFormat;

pub const ENV_API_URL: &str = "GRIDSTUDY_API_URL";
pub const ENV_TOKEN: &str = "GRIDSTUDY_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "GRIDSTUDY_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "GRIDSTUDY_LOG_FORMAT";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Connection settings for the study backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    /// Bearer token attached to every request when present.
    pub token: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var}: {source}")]
    InvalidLogFormat {
        var: &'static str,
        source: gridstudy_observability::ParseLogFormatError,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = normalize_url(&api_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// True when no backend URL was configured and the local default applies.
    pub fn uses_default_api_url(&self) -> bool {
        self.api_url == DEFAULT_API_URL
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, test maps, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = match non_empty(ENV_API_URL) {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidUrl {
                        var: ENV_API_URL,
                        value: url,
                    });
                }
                normalize_url(&url)
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = match non_empty(ENV_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: ENV_TIMEOUT_SECS,
                        value: raw,
                    });
                }
            },
            None => None,
        };

        let log_format = match non_empty(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|source| ConfigError::InvalidLogFormat {
                    var: ENV_LOG_FORMAT,
                    source,
                })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            token: non_empty(ENV_TOKEN),
            timeout,
            log_format,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
