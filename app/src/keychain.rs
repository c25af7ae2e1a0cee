use keyring::Entry;
use log::{error, info};

const SERVICE: &str = "scribe.assemblyai";
const ACCOUNT: &str = "api_key";

/// Somewhere an API key can be kept between runs
pub trait CredentialStore {
    fn load(&self) -> Result<Option<String>, keyring::Error>;
    fn save(&self, key: &str) -> Result<(), keyring::Error>;
    fn delete(&self) -> Result<(), keyring::Error>;
}

/// The OS keychain entry for the service API key
#[derive(Debug, Clone, Copy, Default)]
pub struct Keychain;

impl CredentialStore for Keychain {
    fn load(&self) -> Result<Option<String>, keyring::Error> {
        load_api_key()
    }

    fn save(&self, key: &str) -> Result<(), keyring::Error> {
        save_api_key(key)
    }

    fn delete(&self) -> Result<(), keyring::Error> {
        delete_api_key()
    }
}

pub fn save_api_key(key: &str) -> Result<(), keyring::Error> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;

    match entry.set_password(key) {
        Ok(()) => {
            info!("API key saved to keychain");
            Ok(())
        }
        Err(e) => {
            error!("Failed to save API key: {:?}", e);
            Err(e)
        }
    }
}

pub fn load_api_key() -> Result<Option<String>, keyring::Error> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;

    match entry.get_password() {
        Ok(password) => {
            info!("API key loaded from keychain (length: {})", password.len());
            Ok(Some(password))
        }
        Err(keyring::Error::NoEntry) => {
            info!("No API key found in keychain");
            Ok(None)
        }
        Err(e) => {
            error!("Error loading API key: {:?}", e);
            Err(e)
        }
    }
}

pub fn delete_api_key() -> Result<(), keyring::Error> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;

    match entry.delete_credential() {
        Ok(()) => {
            info!("API key deleted from keychain");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            info!("No API key to delete (not found)");
            Ok(())
        }
        Err(e) => {
            error!("Error deleting API key: {:?}", e);
            Err(e)
        }
    }
}
