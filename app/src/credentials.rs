use log::{info, warn};
use secrecy::SecretString;

use crate::error::Error;
use crate::keychain::CredentialStore;

/// Where the API key for a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum KeySource {
    #[display("command line or environment")]
    Explicit,
    #[display("keychain")]
    Keychain,
}

/// Pick the API key: an explicit value (flag or `ASSEMBLYAI_API_KEY`) wins over
/// the stored one. Blank values count as absent.
pub fn resolve_api_key(
    explicit: Option<&str>,
    store: &impl CredentialStore,
) -> Result<(SecretString, KeySource), Error> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        info!("Using API key from command line or environment");
        return Ok((SecretString::from(key.to_string()), KeySource::Explicit));
    }

    match store.load()? {
        Some(key) if !key.trim().is_empty() => Ok((
            SecretString::from(key.trim().to_string()),
            KeySource::Keychain,
        )),
        Some(_) => {
            warn!("Stored API key is blank, ignoring it");
            Err(Error::ApiKeyMissing)
        }
        None => Err(Error::ApiKeyMissing),
    }
}
