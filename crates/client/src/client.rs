use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::config::{ClientConfig, SpeechModel};
use super::error::TranscriptionError;
use super::http::HttpTransport;
use super::payload::AudioPayload;
use super::transport::Transport;
use super::wire::{non_empty, JobStatus, SubmitRequest};

const UNKNOWN_REMOTE_ERROR: &str = "unknown error";

/// Stage updates emitted while a transcription is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Uploading { bytes: usize },
    Submitting,
    Queued { job_id: String },
    Polling {
        job_id: String,
        attempt: u32,
        status: JobStatus,
    },
    Completed { job_id: String, characters: usize },
}

/// Drives one upload, one job submission and the status polling for it.
///
/// Every call to [`transcribe`](Self::transcribe) is independent: the upload
/// locator and job id live only inside that call. The client itself holds
/// nothing but read-only configuration, so one instance can serve many
/// concurrent transcriptions.
pub struct TranscriptionClient<T = HttpTransport> {
    transport: Arc<T>,
    speech_model: SpeechModel,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
}

impl TranscriptionClient<HttpTransport> {
    /// Create a client talking HTTP to the configured service
    pub fn new(config: &ClientConfig) -> Result<Self, TranscriptionError> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(transport, config)
    }
}

impl<T> Clone for TranscriptionClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            speech_model: self.speech_model,
            poll_interval: self.poll_interval,
            max_poll_attempts: self.max_poll_attempts,
        }
    }
}

impl<T: Transport> TranscriptionClient<T> {
    /// Create a client over any transport, taking the polling policy from config
    pub fn with_transport(transport: T, config: &ClientConfig) -> Result<Self, TranscriptionError> {
        config.validate()?;

        Ok(Self {
            transport: Arc::new(transport),
            speech_model: config.speech_model,
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    /// Transcribe audio to text
    ///
    /// # Returns
    /// * `Ok(String)` - Transcribed text
    /// * `Err(TranscriptionError)` - The stage that failed, see [`TranscriptionError`]
    pub async fn transcribe(&self, payload: AudioPayload) -> Result<String, TranscriptionError> {
        self.transcribe_with(payload, &CancellationToken::new(), &|_| {})
            .await
    }

    /// Transcribe audio to text, reporting progress and honouring cancellation.
    ///
    /// Triggering `cancel` drops whichever request or wait is in flight and
    /// returns [`TranscriptionError::Cancelled`]; no further status checks are
    /// made for the job.
    pub async fn transcribe_with(
        &self,
        payload: AudioPayload,
        cancel: &CancellationToken,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<String, TranscriptionError> {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();

        info!(
            "[{}] Transcribing {} bytes ({})",
            request_id,
            payload.len(),
            payload.media_type()
        );

        let result = self
            .run_stages(&payload, cancel, progress, &request_id)
            .await;

        match &result {
            Ok(text) => info!(
                "[{}] Transcription successful in {}ms: {} characters",
                request_id,
                started_at.elapsed().as_millis(),
                text.len()
            ),
            Err(TranscriptionError::Cancelled) => {
                warn!("[{}] Transcription cancelled", request_id)
            }
            Err(e) => error!("[{}] Transcription error: {}", request_id, e),
        }

        result
    }

    async fn run_stages(
        &self,
        payload: &AudioPayload,
        cancel: &CancellationToken,
        progress: &(dyn Fn(Progress) + Send + Sync),
        request_id: &Uuid,
    ) -> Result<String, TranscriptionError> {
        progress(Progress::Uploading {
            bytes: payload.len(),
        });
        let upload_url = self.upload(payload, cancel).await?;
        info!("[{}] Audio uploaded", request_id);

        progress(Progress::Submitting);
        let job_id = self.submit(&upload_url, cancel).await?;
        info!("[{}] Transcription job created: {}", request_id, job_id);

        progress(Progress::Queued {
            job_id: job_id.clone(),
        });
        let text = self.poll(&job_id, cancel, progress).await?;

        progress(Progress::Completed {
            job_id,
            characters: text.len(),
        });
        Ok(text)
    }

    async fn upload(
        &self,
        payload: &AudioPayload,
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        let response = until_cancelled(cancel, self.transport.upload(payload)).await?;

        non_empty(response.upload_url).ok_or_else(|| {
            error!("Upload response did not include an upload_url");
            TranscriptionError::UploadFailed("Response did not include an upload URL".to_string())
        })
    }

    async fn submit(
        &self,
        upload_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        let request = SubmitRequest {
            audio_url: upload_url,
            speech_model: self.speech_model,
        };
        let response = until_cancelled(cancel, self.transport.submit(&request)).await?;

        non_empty(response.id).ok_or_else(|| {
            error!("Submit response did not include a job id");
            TranscriptionError::SubmissionFailed("Response did not include a job id".to_string())
        })
    }

    async fn poll(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<String, TranscriptionError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let snapshot = until_cancelled(cancel, self.transport.fetch_job(job_id)).await?;

            if let Some(reported) = snapshot.id.as_deref() {
                if reported != job_id {
                    error!("Asked for job {} but the service answered for {}", job_id, reported);
                    return Err(TranscriptionError::PollingFailed(format!(
                        "Status response was for job {} instead of {}",
                        reported, job_id
                    )));
                }
            }

            progress(Progress::Polling {
                job_id: job_id.to_string(),
                attempt,
                status: snapshot.status,
            });

            match snapshot.status {
                JobStatus::Completed => {
                    if snapshot.text.is_none() {
                        warn!("Job {} completed without text", job_id);
                    }
                    return Ok(snapshot.text.unwrap_or_default());
                }
                JobStatus::Error => {
                    let detail = non_empty(snapshot.error)
                        .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string());
                    return Err(TranscriptionError::TranscriptionFailed { detail });
                }
                JobStatus::Unknown => {
                    warn!("Job {} reported an unrecognised status, still waiting", job_id)
                }
                JobStatus::Queued | JobStatus::Processing => {}
            }

            if let Some(max_attempts) = self.max_poll_attempts {
                if attempt >= max_attempts {
                    return Err(TranscriptionError::PollingTimedOut { attempts: attempt });
                }
            }

            until_cancelled(cancel, async {
                tokio::time::sleep(self.poll_interval).await;
                Ok::<(), TranscriptionError>(())
            })
            .await?;
        }
    }
}

/// Run a stage future unless the token fires first
async fn until_cancelled<F, R>(cancel: &CancellationToken, stage: F) -> Result<R, TranscriptionError>
where
    F: Future<Output = Result<R, TranscriptionError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TranscriptionError::Cancelled),
        result = stage => result,
    }
}
