pub mod config;
pub mod credentials;
pub mod error;
pub mod keychain;
pub mod log;
pub mod media;
pub mod service;

pub use error::Error;
