use derive_more::{Display, From};
use scribe_client::TranscriptionError;

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    #[display("{_0}")]
    Transcription(TranscriptionError),

    #[from]
    #[display("Keychain error: {_0}")]
    Keychain(keyring::Error),

    #[from]
    #[display("IO error: {_0}")]
    Io(std::io::Error),

    #[from]
    #[display("Invalid config file: {_0}")]
    Config(serde_json::Error),

    #[display("API key not configured")]
    ApiKeyMissing,

    #[display("Unsupported file extension: {_0}")]
    UnsupportedExtension(String),
}

impl std::error::Error for Error {}

impl Error {
    /// Returns a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Error::Transcription(e) => e.user_message(),
            Error::Keychain(_) => "Could not access the system keychain.".to_string(),
            Error::Io(_) => "Failed to read audio file. Please try again.".to_string(),
            Error::Config(e) => format!("Config file could not be read: {}", e),
            Error::ApiKeyMissing => {
                "API key not configured. Set ASSEMBLYAI_API_KEY or run `scribe auth set`."
                    .to_string()
            }
            Error::UnsupportedExtension(ext) => {
                if ext.is_empty() {
                    "Unsupported file type. Please choose an audio file.".to_string()
                } else {
                    format!("Unsupported file type (.{}). Please choose an audio file.", ext)
                }
            }
        }
    }
}
