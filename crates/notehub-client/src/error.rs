//! Client error type.

use thiserror::Error;

/// Result type alias using the client's error type.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures seen by client callers.
#[derive(Error, Debug)]
pub enum ClientError {
    /// An authenticated request was rejected with 401. The session is gone
    /// and the user has to log in again.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// The action needs a session and there is none.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The server answered with an error status and message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Transport failure or undecodable response body
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of a server-side rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Message to show inline: the server's own error string when there is
    /// one, otherwise `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            ClientError::SessionExpired | ClientError::NotAuthenticated => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<notehub_core::Error> for ClientError {
    fn from(e: notehub_core::Error) -> Self {
        ClientError::Validation(e.to_string())
    }
}
