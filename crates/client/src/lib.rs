//! Client for a remote speech-to-text service.
//!
//! A transcription is three sequential stages: upload the audio, submit a job
//! for the uploaded resource, then poll the job until it completes or fails.
//! [`TranscriptionClient`] drives all three and reports the first failure as a
//! [`TranscriptionError`] naming the stage.

mod client;
mod config;
mod error;
mod http;
mod payload;
mod transport;
mod wire;

// Re-export public types
pub use client::{Progress, TranscriptionClient};
pub use config::{ClientConfig, SpeechModel, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
pub use error::TranscriptionError;
pub use http::HttpTransport;
pub use payload::AudioPayload;
pub use transport::Transport;
pub use wire::{JobSnapshot, JobStatus, SubmitRequest, SubmitResponse, UploadResponse};

pub use tokio_util::sync::CancellationToken;
