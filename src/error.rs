//! Error types for annograph.

use thiserror::Error;

/// Result type for annograph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annograph operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Pipeline configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
