//! Error types for NoteHub.

use thiserror::Error;

/// Result type alias using NoteHub's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for NoteHub operations.
///
/// Variants follow the HTTP taxonomy the API exposes: validation problems are
/// `InvalidInput`, credential problems are `Unauthorized`, ownership and
/// membership failures are `Forbidden`, and so on.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, or not visible to the caller
    #[error("{0}")]
    NotFound(String),

    /// Missing or malformed input (fields, file type, file size)
    #[error("{0}")]
    InvalidInput(String),

    /// Bad credentials or missing/expired token
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not owner, admin, or member
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate email, already-a-member
    #[error("{0}")]
    Conflict(String),

    /// External metadata host failed
    #[error("{0}")]
    Upstream(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
