use async_trait::async_trait;

use super::error::TranscriptionError;
use super::payload::AudioPayload;
use super::wire::{JobSnapshot, SubmitRequest, SubmitResponse, UploadResponse};

/// The three wire calls the transcription protocol is built from.
///
/// Each implementation knows how to:
/// - Reach the service and attach the credential
/// - Decode the response body into its schema
/// - Report failures as the error of the stage it belongs to
///
/// Field-level checks (missing locator, missing job id) are left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw audio bytes to the service's upload endpoint
    async fn upload(&self, payload: &AudioPayload) -> Result<UploadResponse, TranscriptionError>;

    /// Create a transcription job for an uploaded resource
    async fn submit(
        &self,
        request: &SubmitRequest<'_>,
    ) -> Result<SubmitResponse, TranscriptionError>;

    /// Read the current state of a job
    async fn fetch_job(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError>;
}
