//! Centralized error types for the festival client.

use thiserror::Error;

/// Main error type for festival client operations.
#[derive(Error, Debug)]
pub enum FestivalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from {endpoint}: {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upload rejected for '{file}': {reason}")]
    UploadRejected { file: String, reason: String },

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for festival client operations.
pub type FestivalResult<T> = Result<T, FestivalError>;

impl FestivalError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an upload rejection.
    pub fn upload_rejected(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UploadRejected {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
