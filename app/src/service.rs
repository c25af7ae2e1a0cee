//! Entry points for callers that hold a file and want its transcript.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use log::{error, info};
use scribe_client::{
    AudioPayload, CancellationToken, Progress, Transport, TranscriptionClient,
};

use crate::error::Error;
use crate::media::media_type_for;

/// Read an audio file and declare its media type from the extension
pub async fn load_payload(path: &Path) -> Result<AudioPayload, Error> {
    let media_type = media_type_for(path)?;
    let bytes = tokio::fs::read(path).await?;
    info!("Read {} bytes from {:?} ({})", bytes.len(), path, media_type);
    Ok(AudioPayload::new(bytes, media_type)?)
}

/// Transcribe a file, resolving to the transcript or a message fit for display
pub async fn submit<T: Transport>(
    client: &TranscriptionClient<T>,
    path: &Path,
) -> Result<String, String> {
    submit_with(client, path, &CancellationToken::new(), &|_| {})
        .await
        .map_err(|e| e.user_message())
}

/// [`submit`] with cancellation and stage progress
pub async fn submit_with<T: Transport>(
    client: &TranscriptionClient<T>,
    path: &Path,
    cancel: &CancellationToken,
    progress: &(dyn Fn(Progress) + Send + Sync),
) -> Result<String, Error> {
    let payload = load_payload(path).await?;
    let text = client.transcribe_with(payload, cancel, progress).await?;
    Ok(text)
}

/// Result of transcribing one of several files
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<String, Error>,
    /// Where the transcript was written, when an output directory was given
    pub written_to: Option<PathBuf>,
    /// Set when the transcript succeeded but could not be saved; the text
    /// stays in `result`
    pub write_error: Option<Error>,
}

/// Transcribe every file concurrently, each as its own independent run.
///
/// With `output_dir`, each transcript is written to `<file stem>.txt` there.
/// Files sharing a stem get `<stem>-2.txt`, `<stem>-3.txt` and so on, in the
/// order given. Outcomes come back in that order too.
pub async fn transcribe_files<T: Transport>(
    client: &TranscriptionClient<T>,
    files: &[PathBuf],
    output_dir: Option<&Path>,
    cancel: &CancellationToken,
) -> Vec<FileOutcome> {
    let targets: Vec<Option<PathBuf>> = match output_dir {
        Some(dir) => transcript_paths(dir, files).into_iter().map(Some).collect(),
        None => vec![None; files.len()],
    };

    let runs = files.iter().zip(targets).map(|(path, target)| async move {
        let progress = |event: Progress| log_progress(path, &event);
        let result = submit_with(client, path, cancel, &progress).await;

        let mut written_to = None;
        let mut write_error = None;
        match (&result, target) {
            (Ok(text), Some(target)) => match write_transcript(&target, text).await {
                Ok(()) => written_to = Some(target),
                Err(e) => {
                    error!("Failed to write transcript of {:?} to {:?}: {}", path, target, e);
                    write_error = Some(e);
                }
            },
            (Err(e), _) => error!("Failed to transcribe {:?}: {}", path, e),
            (Ok(_), None) => {}
        }

        FileOutcome {
            path: path.clone(),
            result,
            written_to,
            write_error,
        }
    });

    join_all(runs).await
}

/// One distinct `.txt` target per input file
fn transcript_paths(dir: &Path, files: &[PathBuf]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();

    files
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "transcription".to_string());

            let mut name = format!("{}.txt", stem);
            let mut copy = 1;
            while !taken.insert(name.clone()) {
                copy += 1;
                name = format!("{}-{}.txt", stem, copy);
            }
            dir.join(name)
        })
        .collect()
}

async fn write_transcript(target: &Path, text: &str) -> Result<(), Error> {
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(target, text).await?;
    info!("Transcript written to {:?}", target);
    Ok(())
}

fn log_progress(path: &Path, event: &Progress) {
    match event {
        Progress::Uploading { bytes } => info!("{:?}: uploading {} bytes", path, bytes),
        Progress::Submitting => info!("{:?}: requesting transcription", path),
        Progress::Queued { job_id } => info!("{:?}: job {} queued", path, job_id),
        Progress::Polling {
            job_id,
            attempt,
            status,
        } => info!("{:?}: job {} is {} (check {})", path, job_id, status, attempt),
        Progress::Completed { characters, .. } => {
            info!("{:?}: done, {} characters", path, characters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_client::{ClientConfig, HttpTransport, TranscriptionError};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_bytes, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TranscriptionClient<HttpTransport> {
        let config = ClientConfig::new("test-key")
            .with_base_url(format!("{}/v2", server.uri()))
            .with_poll_interval(Duration::from_millis(10));
        TranscriptionClient::new(&config).unwrap()
    }

    /// One full upload/submit/complete exchange keyed on the file contents
    async fn mount_job(server: &MockServer, contents: &str, job: &str, text: &str) {
        Mock::given(method("POST"))
            .and(url_path("/v2/upload"))
            .and(body_bytes(contents.as_bytes().to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upload_url": format!("https://cdn.example.com/{}", job)
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/v2/transcript"))
            .and(wiremock::matchers::body_partial_json(json!({
                "audio_url": format!("https://cdn.example.com/{}", job)
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": job })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path(format!("/v2/transcript/{}", job)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": job,
                "status": "completed",
                "text": text
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn submit_returns_transcript_text() {
        let server = MockServer::start().await;
        mount_job(&server, "first audio", "job-1", "hello world").await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.mp3");
        std::fs::write(&file, "first audio").unwrap();

        let text = submit(&client_for(&server), &file).await;

        assert_eq!(text, Ok("hello world".to_string()));
    }

    #[tokio::test]
    async fn submit_reports_readable_messages() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.wav");
        assert_eq!(
            submit(&client_for(&server), &missing).await,
            Err("Failed to read audio file. Please try again.".to_string())
        );

        let text_file = dir.path().join("notes.txt");
        std::fs::write(&text_file, "not audio").unwrap();
        assert_eq!(
            submit(&client_for(&server), &text_file).await,
            Err("Unsupported file type (.txt). Please choose an audio file.".to_string())
        );

        // Nothing mounted: the upload gets a 404
        let audio = dir.path().join("memo.wav");
        std::fs::write(&audio, "audio").unwrap();
        assert_eq!(
            submit(&client_for(&server), &audio).await,
            Err("Failed to upload audio file".to_string())
        );
    }

    #[tokio::test]
    async fn transcribes_several_files_independently() {
        let server = MockServer::start().await;
        mount_job(&server, "first audio", "job-1", "first transcript").await;
        mount_job(&server, "second audio", "job-2", "second transcript").await;

        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let first = input.path().join("first.wav");
        let second = input.path().join("second.m4a");
        std::fs::write(&first, "first audio").unwrap();
        std::fs::write(&second, "second audio").unwrap();

        let outcomes = transcribe_files(
            &client_for(&server),
            &[first.clone(), second.clone()],
            Some(output.path()),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].path, first);
        assert_eq!(outcomes[0].result.as_deref().unwrap(), "first transcript");
        assert_eq!(outcomes[1].result.as_deref().unwrap(), "second transcript");

        let written = output.path().join("second.txt");
        assert_eq!(outcomes[1].written_to.as_deref(), Some(written.as_path()));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "second transcript");
        assert_eq!(
            std::fs::read_to_string(output.path().join("first.txt")).unwrap(),
            "first transcript"
        );
    }

    #[tokio::test]
    async fn cancelled_batch_reports_cancellation() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.wav");
        std::fs::write(&file, "audio").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes = transcribe_files(&client_for(&server), &[file], None, &cancel).await;

        assert!(matches!(
            outcomes[0].result,
            Err(Error::Transcription(TranscriptionError::Cancelled))
        ));
        assert!(outcomes[0].written_to.is_none());
    }

    #[tokio::test]
    async fn files_sharing_a_stem_get_separate_transcripts() {
        let server = MockServer::start().await;
        mount_job(&server, "first audio", "job-1", "transcript A").await;
        mount_job(&server, "second audio", "job-2", "transcript B").await;

        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("x")).unwrap();
        std::fs::create_dir_all(input.path().join("y")).unwrap();
        let first = input.path().join("x/memo.mp3");
        let second = input.path().join("y/memo.wav");
        std::fs::write(&first, "first audio").unwrap();
        std::fs::write(&second, "second audio").unwrap();

        let outcomes = transcribe_files(
            &client_for(&server),
            &[first, second],
            Some(output.path()),
            &CancellationToken::new(),
        )
        .await;

        let memo = output.path().join("memo.txt");
        let memo_2 = output.path().join("memo-2.txt");
        assert_eq!(outcomes[0].written_to.as_deref(), Some(memo.as_path()));
        assert_eq!(outcomes[1].written_to.as_deref(), Some(memo_2.as_path()));
        assert_eq!(std::fs::read_to_string(memo).unwrap(), "transcript A");
        assert_eq!(std::fs::read_to_string(memo_2).unwrap(), "transcript B");
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn unwritable_output_keeps_the_transcript() {
        let server = MockServer::start().await;
        mount_job(&server, "first audio", "job-1", "hello world").await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.mp3");
        std::fs::write(&file, "first audio").unwrap();
        // A regular file where the output directory should be
        let blocked = dir.path().join("out");
        std::fs::write(&blocked, "").unwrap();

        let outcomes = transcribe_files(
            &client_for(&server),
            &[file],
            Some(blocked.as_path()),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcomes[0].result.as_deref().unwrap(), "hello world");
        assert!(outcomes[0].written_to.is_none());
        assert!(matches!(outcomes[0].write_error, Some(Error::Io(_))));
    }

    #[test]
    fn transcript_paths_use_file_stems() {
        let dir = Path::new("/tmp/out");
        let files = vec![
            PathBuf::from("/audio/interview.final.mp3"),
            PathBuf::from("/a/memo.mp3"),
            PathBuf::from("/b/memo.wav"),
            PathBuf::from("/a/memo.mp3"),
        ];

        assert_eq!(
            transcript_paths(dir, &files),
            vec![
                PathBuf::from("/tmp/out/interview.final.txt"),
                PathBuf::from("/tmp/out/memo.txt"),
                PathBuf::from("/tmp/out/memo-2.txt"),
                PathBuf::from("/tmp/out/memo-3.txt"),
            ]
        );
    }
}
