//! Course handlers.

use axum::{extract::State, http::StatusCode, Json};

use notehub_core::{Course, CreateCourseRequest};

use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::{ApiError, AppState};

#[utoipa::path(get, path = "/api/courses", tag = "Courses",
    responses((status = 200, description = "All courses by name", body = Vec<Course>)))]
pub async fn list_courses(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.course_service().list().await?))
}

#[utoipa::path(post, path = "/api/courses", tag = "Courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Name missing")))]
pub async fn create_course(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(req): JsonBody<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = state.course_service().create(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}
