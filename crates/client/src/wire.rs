//! Request and response bodies exchanged with the transcription service.

use serde::{Deserialize, Serialize};

use super::config::SpeechModel;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub upload_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmitRequest<'a> {
    pub audio_url: &'a str,
    pub speech_model: SpeechModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: Option<String>,
}

/// Job lifecycle as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    /// Any status this client doesn't know about; treated as still running
    #[serde(other)]
    Unknown,
}

/// One fresh read of a job's state
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Treat absent, null and blank fields the same way
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        let test_cases = vec![
            ("queued", JobStatus::Queued),
            ("processing", JobStatus::Processing),
            ("completed", JobStatus::Completed),
            ("error", JobStatus::Error),
            ("throttled", JobStatus::Unknown),
        ];

        for (raw, expected) in test_cases {
            let snapshot: JobSnapshot =
                serde_json::from_value(json!({ "id": "job-1", "status": raw })).unwrap();
            assert_eq!(snapshot.status, expected, "status {:?}", raw);
        }
    }

    #[test]
    fn test_snapshot_without_status_is_rejected() {
        let result: Result<JobSnapshot, _> =
            serde_json::from_value(json!({ "id": "job-1", "text": "hi" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_responses_tolerate_missing_and_extra_fields() {
        let upload: UploadResponse = serde_json::from_value(json!({ "other": 1 })).unwrap();
        assert_eq!(upload.upload_url, None);

        let submit: SubmitResponse =
            serde_json::from_value(json!({ "id": null, "status": "queued" })).unwrap();
        assert_eq!(submit.id, None);
    }

    #[test]
    fn test_submit_request_body() {
        let body = serde_json::to_value(SubmitRequest {
            audio_url: "https://cdn.example.com/upload/1",
            speech_model: SpeechModel::Universal,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "audio_url": "https://cdn.example.com/upload/1",
                "speech_model": "universal"
            })
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }
}
