//! Registration, login and profile handlers.

use axum::{extract::State, http::StatusCode, Json};

use notehub_core::PublicUser;

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::services::{LoginRequest, LoginResponse, RegisterRequest};
use crate::extract::JsonBody;
use crate::{ApiError, AppState};

/// Create an account.
///
/// # Returns
/// - 201 Created with a confirmation message
/// - 400 Bad Request if a field is missing or malformed
/// - 409 Conflict if the email is already registered
#[utoipa::path(post, path = "/api/auth/register", tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already in use")))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.auth_service().register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(post, path = "/api/auth/login", tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(state.auth_service().login(req).await?))
}

#[utoipa::path(get, path = "/api/auth/profile", tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Missing or invalid token")))]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(state.auth_service().profile(user.user_id).await?))
}
