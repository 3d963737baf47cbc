use thiserror::Error;

use crate::protocol::DecodeError;

/// Custom error types for rftime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Radio error: {0}")]
    Radio(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Synchronization aborted after {attempts} attempts ({elapsed_ms} ms)")]
    SyncAborted {
        /// Attempts made before giving up
        attempts: u64,
        /// Milliseconds spent polling
        elapsed_ms: u64,
    },
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new radio error
    pub fn radio(msg: impl Into<String>) -> Self {
        Error::Radio(msg.into())
    }
}
