const GENERIC_FAILURE: &str = "Failed to transcribe audio";

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Polling failed: {0}")]
    PollingFailed(String),
    #[error("Transcription failed: {detail}")]
    TranscriptionFailed { detail: String },
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("Transcription still pending after {attempts} status checks")]
    PollingTimedOut { attempts: u32 },
    #[error("Transcription cancelled")]
    Cancelled,
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl TranscriptionError {
    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        let message = match self {
            TranscriptionError::UploadFailed(_) => "Failed to upload audio file".to_string(),
            TranscriptionError::SubmissionFailed(_) => {
                "Failed to request transcription".to_string()
            }
            TranscriptionError::PollingFailed(_) => {
                "Failed while waiting for transcription results".to_string()
            }
            TranscriptionError::TranscriptionFailed { detail } => {
                if detail.trim().is_empty() {
                    String::new()
                } else {
                    format!("Transcription failed: {}", detail)
                }
            }
            TranscriptionError::UnsupportedFormat(media_type) => {
                if media_type.is_empty() {
                    "Unsupported file type. Please choose an audio file.".to_string()
                } else {
                    format!(
                        "Unsupported file type ({}). Please choose an audio file.",
                        media_type
                    )
                }
            }
            TranscriptionError::PollingTimedOut { .. } => {
                "Transcription took too long. Try again.".to_string()
            }
            TranscriptionError::Cancelled => "Transcription cancelled.".to_string(),
            TranscriptionError::InvalidConfig(_) => {
                "Transcription service is not configured correctly.".to_string()
            }
        };

        if message.is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }

    /// Remote-reported job failure detail, if this error came from the service.
    pub fn remote_detail(&self) -> Option<&str> {
        match self {
            TranscriptionError::TranscriptionFailed { detail } => Some(detail),
            _ => None,
        }
    }
}
