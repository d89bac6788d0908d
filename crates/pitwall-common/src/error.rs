//! Error types for Pitwall

use thiserror::Error;

/// Result type alias for Pitwall operations
pub type Result<T> = std::result::Result<T, PitwallError>;

/// Main error type for Pitwall
#[derive(Error, Debug)]
pub enum PitwallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown session kind: {0}")]
    UnknownSessionKind(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
