//! HTTP error mapping.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use notehub_crypto::CryptoError;

/// Generic body for unexpected failures.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Include internal error detail in 500 responses (development only).
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL.store(expose, Ordering::Relaxed);
}

/// Error returned by handlers; renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    Internal(notehub_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Upstream(String),
}

impl From<notehub_core::Error> for ApiError {
    fn from(err: notehub_core::Error) -> Self {
        use notehub_core::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Upstream(msg) => ApiError::Upstream(msg),
            Error::Database(sqlx_err) => {
                if let Some(db_err) = sqlx_err.as_database_error() {
                    if db_err.is_unique_violation() {
                        return ApiError::Conflict("Resource already exists".to_string());
                    }
                    if db_err.is_foreign_key_violation() {
                        return ApiError::BadRequest(
                            "Referenced course or group does not exist".to_string(),
                        );
                    }
                }
                ApiError::Internal(Error::Database(sqlx_err))
            }
            other => ApiError::Internal(other),
        }
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        ApiError::Internal(notehub_core::Error::Internal(err.to_string()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                if EXPOSE_INTERNAL.load(Ordering::Relaxed) {
                    err.to_string()
                } else {
                    INTERNAL_MESSAGE.to_string()
                }
            }
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Upstream(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notehub_core::Error;

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_domain_message_is_kept() {
        match ApiError::from(Error::NotFound("Note not found".into())) {
            ApiError::NotFound(msg) => assert_eq!(msg, "Note not found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_crypto_errors_are_internal() {
        let err = ApiError::from(CryptoError::Hashing("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
