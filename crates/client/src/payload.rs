use std::fmt;

use bytes::Bytes;

use super::error::TranscriptionError;

/// Audio bytes plus the media type they were declared with.
///
/// Only the media type is checked: it must be an `audio/*` type. The bytes are
/// handed to the service as-is, and cloning shares them instead of copying.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioPayload {
    bytes: Bytes,
    media_type: String,
}

impl AudioPayload {
    pub fn new(
        bytes: impl Into<Bytes>,
        media_type: impl Into<String>,
    ) -> Result<Self, TranscriptionError> {
        let media_type = media_type.into();

        if !is_audio_media_type(&media_type) {
            return Err(TranscriptionError::UnsupportedFormat(media_type));
        }

        Ok(Self {
            bytes: bytes.into(),
            media_type,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes for a request body
    pub fn body(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioPayload")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn is_audio_media_type(media_type: &str) -> bool {
    // Parameters such as `; codecs=opus` don't matter here
    let essence = media_type.split(';').next().unwrap_or("").trim();

    match essence.split_once('/') {
        Some((kind, subtype)) => kind.eq_ignore_ascii_case("audio") && !subtype.is_empty(),
        None => false,
    }
}
