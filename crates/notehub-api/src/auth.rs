//! Bearer token authentication.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use notehub_crypto::CryptoError;

use crate::{ApiError, AppState};

/// Message for a request without a usable token.
pub const NO_TOKEN_MESSAGE: &str = "Access denied. No token provided.";

/// Message for a token that fails verification or has expired.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Extractor for authenticated requests.
///
/// Validates the `Authorization: Bearer <token>` header and yields the user id
/// and email the token was issued for. Any failure rejects with 401.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     format!("hello {}", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Pull the raw token out of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized(NO_TOKEN_MESSAGE.to_string()))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            let reason = match e {
                CryptoError::Expired => "expired",
                CryptoError::InvalidSignature => "bad_signature",
                _ => "malformed",
            };
            debug!(subsystem = "auth", component = "extractor", reason, "Rejected token");
            ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}
