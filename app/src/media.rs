use std::path::Path;

use crate::error::Error;

/// Map an audio file's extension to the media type it is declared with
pub fn media_type_for(path: &Path) -> Result<&'static str, Error> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let media_type = match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        "amr" => "audio/amr",
        "aiff" | "aif" => "audio/aiff",
        "wma" => "audio/x-ms-wma",
        _ => return Err(Error::UnsupportedExtension(extension)),
    };

    Ok(media_type)
}
