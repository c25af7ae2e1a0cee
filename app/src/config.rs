use std::path::Path;
use std::time::Duration;

use log::info;
use scribe_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// App configuration, optionally read from a JSON file and overridden by flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[serde(alias = "base_url")]
    pub base_url: String,
    /// Milliseconds between status checks
    #[serde(alias = "poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Give up after this many status checks (default: never)
    #[serde(alias = "max_poll_attempts")]
    pub max_poll_attempts: Option<u32>,
    #[serde(alias = "request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            max_poll_attempts: None,
            request_timeout_secs: None,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(poll_interval_ms) = overrides.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
        if overrides.max_poll_attempts.is_some() {
            self.max_poll_attempts = overrides.max_poll_attempts;
        }
        if overrides.request_timeout_secs.is_some() {
            self.request_timeout_secs = overrides.request_timeout_secs;
        }
        self
    }

    pub fn client_config(&self, api_key: SecretString) -> ClientConfig {
        ClientConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_poll_attempts(self.max_poll_attempts)
            .with_request_timeout(self.request_timeout_secs.map(Duration::from_secs))
    }
}
