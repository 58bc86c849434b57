//! Error types for the fittrack_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fittrack_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input (dates, lengths, indices)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// AI estimation service failure (transport, API or malformed response)
    #[error("AI service error: {0}")]
    Ai(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Transport errors drop the request URL before they are displayed
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Ai(e.without_url().to_string())
    }
}
