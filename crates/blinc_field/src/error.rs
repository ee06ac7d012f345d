//! Error types for blinc_field

use thiserror::Error;

/// Errors raised while loading or parsing field configuration
#[derive(Error, Debug)]
pub enum FieldError {
    /// Failed to read a configuration file
    #[error("Config read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML configuration
    #[error("Config parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid JSON payload (option lists, values)
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an option request
///
/// Cloneable so one failed in-flight request can be delivered to every
/// resolver that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request function failed (transport, server error, ...)
    #[error("Option request failed: {0}")]
    Request(String),

    /// The response could not be turned into an option list
    #[error("Option response decoding failed: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Result type for blinc_field configuration operations
pub type Result<T> = std::result::Result<T, FieldError>;
