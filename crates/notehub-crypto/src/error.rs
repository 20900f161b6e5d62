//! Error types for cryptographic operations.

use thiserror::Error;

/// Password and token errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Hashing a password failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Stored hash is not a valid PHC string.
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),

    /// Signing secret is too short.
    #[error("Signing secret too short (minimum {0} bytes required)")]
    WeakSecret(usize),

    /// Token does not have the `header.payload.signature` shape or fails to decode.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token algorithm is not the one we sign with.
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not match.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token lifetime has passed.
    #[error("Token expired")]
    Expired,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
