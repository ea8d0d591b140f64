use std::time::Duration;

use crate::error::{AppError, Result};

pub const API_URL: &str = "http://127.0.0.1:8080";

/// Lower price bound sent to `/search` when the user leaves it blank.
pub const DEFAULT_MIN_PRICE: f64 = 0.0;

/// Upper price bound sent to `/search` when the user leaves it blank.
pub const DEFAULT_MAX_PRICE: f64 = 999_999.0;

/// Per-request timeout. A hung backend surfaces as a transport failure.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Channel capacity for request completions in the TUI.
pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub log_level: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Config("REQUEST_TIMEOUT_SECS must be a whole number of seconds".to_string())
            })?;

        Ok(Self {
            api_url: std::env::var("API_URL")
                .unwrap_or_else(|_| API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Config pointing at an explicit backend, used by tests and the `--api-url` flag.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            log_level: "info".to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}
