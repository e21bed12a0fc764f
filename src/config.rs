//! Runtime configuration.

use crate::error::ConfigError;
use crate::validator::DEFAULT_DEBOUNCE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_SERVER_URL: &str = "FLOWDRAFT_SERVER_URL";
const ENV_REQUEST_TIMEOUT: &str = "FLOWDRAFT_REQUEST_TIMEOUT_SECS";
const ENV_DEBOUNCE: &str = "FLOWDRAFT_VALIDATION_DEBOUNCE_MS";

/// Settings shared by the HTTP client and editing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the workflow server, without a trailing slash.
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Quiet period before a debounced validation pass runs.
    pub validation_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            validation_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing keys take their default value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overridden by any `FLOWDRAFT_*` variable that is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL) {
            self.server_url = url;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT, value)?;
        }
        if let Some(value) = lookup(ENV_DEBOUNCE) {
            self.validation_debounce_ms = parse_number(ENV_DEBOUNCE, value)?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }
}

fn parse_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
