//! Error types for the sweeper

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sweeper
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Envelope / key errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    // Wallet platform errors
    #[error("Platform returned {status}: {body}")]
    Platform { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // Balance observer errors
    #[error("Balances did not arrive after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Operation cancelled")]
    Cancelled,

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    ///
    /// Only a classification: the pipeline does not retry anything today,
    /// see [`Error::is_fatal`].
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Platform { status, .. } => *status >= 500 || *status == 429,
            Error::Http(_) | Error::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Whether this error aborts the run under the current policy
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
