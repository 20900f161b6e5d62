//! Router assembly and HTTP middleware.

use std::any::Any;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use notehub_core::defaults::{ALLOWED_ORIGINS, UPLOADS_URL_PREFIX};

use crate::error::INTERNAL_MESSAGE;
use crate::handlers::{auth, courses, external, groups, health, notes, MessageResponse};
use crate::services::{LoginRequest, LoginResponse, RegisterRequest};
use crate::{ApiError, AppState};

/// Request ID generator producing UUIDv7 values.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically, which helps
/// when correlating log lines.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// OpenAPI document served at `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NoteHub API",
        description = "Note sharing for students: markdown notes, courses, study groups and a public feed"
    ),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::profile,
        notes::list_public_notes,
        notes::list_notes,
        notes::create_note,
        notes::update_note,
        notes::delete_note,
        notes::delete_attachment,
        courses::list_courses,
        courses::create_course,
        groups::list_groups,
        groups::create_group,
        groups::get_group,
        groups::list_group_notes,
        groups::invite_member,
        groups::remove_member,
        external::youtube_metadata,
    ),
    components(schemas(
        notehub_core::PublicUser,
        notehub_core::UserSummary,
        notehub_core::OwnerRef,
        notehub_core::Course,
        notehub_core::CourseRef,
        notehub_core::CreateCourseRequest,
        notehub_core::Note,
        notehub_core::NoteWithRelations,
        notehub_core::FileKind,
        notehub_core::Attachment,
        notehub_core::StudyGroup,
        notehub_core::MemberInfo,
        notehub_core::GroupDetails,
        notehub_core::UserGroups,
        notehub_core::VideoMetadata,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        MessageResponse,
        health::HealthResponse,
        groups::CreateGroupBody,
        groups::InviteBody,
        external::VideoLookupRequest,
    )),
    tags(
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Notes", description = "Note CRUD and attachments"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Groups", description = "Study groups and shared notes"),
        (name = "External", description = "Video metadata lookup"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(subsystem = "api", panic = %detail, "Handler panicked");
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": INTERNAL_MESSAGE })),
    )
        .into_response()
}

/// Parse a comma-separated CORS origin list. Invalid entries are skipped;
/// an empty list falls back to the defaults.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let source = if origins.trim().is_empty() {
        ALLOWED_ORIGINS
    } else {
        origins
    };

    source
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                warn!("Invalid CORS origin '{}': missing scheme", trimmed);
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi_json))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile))
        // Notes: the static `/public` route wins over `/:id`
        .route("/notes/public", get(notes::list_public_notes))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            put(notes::update_note).delete(notes::delete_note),
        )
        .route(
            "/notes/:note_id/attachments/:attachment_id",
            delete(notes::delete_attachment),
        )
        // Courses
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        // Groups
        .route(
            "/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/groups/:id", get(groups::get_group))
        .route("/groups/:id/notes", get(groups::list_group_notes))
        .route("/groups/:id/invite", post(groups::invite_member))
        .route(
            "/groups/:id/members/:member_id",
            delete(groups::remove_member),
        )
        // External
        .route("/external/youtube", post(external::youtube_metadata))
}

/// Build the full application router with middleware.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let allowed_origins = parse_allowed_origins(&config.allowed_origins);

    Router::new()
        .nest("/api", api_routes())
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&config.upload_dir))
        .fallback(route_not_found)
        // Multipart and JSON extractors stop reading past this size.
        .layer(DefaultBodyLimit::max(config.body_limit()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://notes.example.edu, http://localhost:5173");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://notes.example.edu");

        let origins = parse_allowed_origins("https://valid.edu,not-a-url,http://localhost:3000");
        assert_eq!(origins.len(), 2);

        let origins = parse_allowed_origins("  ");
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/profile",
            "/api/notes",
            "/api/notes/public",
            "/api/notes/{id}",
            "/api/notes/{note_id}/attachments/{attachment_id}",
            "/api/courses",
            "/api/groups",
            "/api/groups/{id}",
            "/api/groups/{id}/notes",
            "/api/groups/{id}/invite",
            "/api/groups/{id}/members/{member_id}",
            "/api/external/youtube",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
