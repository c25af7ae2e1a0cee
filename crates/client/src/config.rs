use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::error::TranscriptionError;

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com/v2";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Speech model requested when a transcription job is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpeechModel {
    /// General-purpose accuracy model
    #[default]
    Universal,
}

/// Configuration for talking to the transcription service
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: SecretString,
    /// Service root, e.g. `https://api.assemblyai.com/v2`
    pub base_url: String,
    pub speech_model: SpeechModel,
    /// Wait between status checks while a job is queued or processing
    pub poll_interval: Duration,
    /// `None` polls until the job reaches a terminal status
    pub max_poll_attempts: Option<u32>,
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            speech_model: SpeechModel::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            request_timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, max_poll_attempts: Option<u32>) -> Self {
        self.max_poll_attempts = max_poll_attempts;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Reject settings no transcription could succeed with
    pub fn validate(&self) -> Result<(), TranscriptionError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(TranscriptionError::InvalidConfig(
                "API key is empty".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(TranscriptionError::InvalidConfig(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        if self.max_poll_attempts == Some(0) {
            return Err(TranscriptionError::InvalidConfig(
                "Max poll attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Build a full endpoint URL from a path relative to the service root
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("speech_model", &self.speech_model)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
