//! Core error types

use thiserror::Error;

/// Core error type for the bootstrap workspace
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
