//! reqwest-backed transport for the transcription service.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use super::config::ClientConfig;
use super::error::TranscriptionError;
use super::payload::AudioPayload;
use super::transport::Transport;
use super::wire::{JobSnapshot, SubmitRequest, SubmitResponse, UploadResponse};

/// HTTP transport shared by every stage of every transcription.
///
/// Cloning is cheap; the underlying connection pool is reference counted.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TranscriptionError> {
        config.validate()?;

        reqwest::Url::parse(&config.base_url).map_err(|e| {
            TranscriptionError::InvalidConfig(format!(
                "Invalid base URL '{}': {}",
                config.base_url, e
            ))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(|e| {
            error!("Failed to create HTTP client: {}", e);
            TranscriptionError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .post(self.config.endpoint(path))
            .header(AUTHORIZATION, self.config.api_key.expose_secret())
    }

    fn get(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.http_client
            .get(url)
            .header(AUTHORIZATION, self.config.api_key.expose_secret())
    }

    /// Status URL for a job, with the id encoded as a single path segment
    fn job_url(&self, job_id: &str) -> Result<reqwest::Url, TranscriptionError> {
        let mut url = reqwest::Url::parse(&self.config.endpoint("transcript"))
            .map_err(|e| TranscriptionError::PollingFailed(format!("Invalid status URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                TranscriptionError::PollingFailed(format!(
                    "Base URL '{}' cannot carry a job id",
                    self.config.base_url
                ))
            })?
            .push(job_id);

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload(&self, payload: &AudioPayload) -> Result<UploadResponse, TranscriptionError> {
        let response = self
            .post("upload")
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload.body())
            .send()
            .await
            .map_err(|e| {
                error!("Upload request error: {}", e);
                TranscriptionError::UploadFailed(format!("Request failed: {}", e))
            })?;

        decode(response).await.map_err(|cause| {
            error!("Upload error response: {}", cause);
            TranscriptionError::UploadFailed(cause)
        })
    }

    async fn submit(
        &self,
        request: &SubmitRequest<'_>,
    ) -> Result<SubmitResponse, TranscriptionError> {
        let response = self
            .post("transcript")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Submit request error: {}", e);
                TranscriptionError::SubmissionFailed(format!("Request failed: {}", e))
            })?;

        decode(response).await.map_err(|cause| {
            error!("Submit error response: {}", cause);
            TranscriptionError::SubmissionFailed(cause)
        })
    }

    async fn fetch_job(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError> {
        let response = self
            .get(self.job_url(job_id)?)
            .send()
            .await
            .map_err(|e| {
                error!("Status request error for job {}: {}", job_id, e);
                TranscriptionError::PollingFailed(format!("Request failed: {}", e))
            })?;

        let snapshot: JobSnapshot = decode(response).await.map_err(|cause| {
            error!("Status error response for job {}: {}", job_id, cause);
            TranscriptionError::PollingFailed(cause)
        })?;

        debug!("Job {} status: {}", job_id, snapshot.status);
        Ok(snapshot)
    }
}

/// Check the status code, then decode the JSON body
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("API returned status {}: {}", status, error_text));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
