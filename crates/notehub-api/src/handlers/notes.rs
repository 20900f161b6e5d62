//! Note handlers.
//!
//! Create and update accept either JSON or `multipart/form-data`; see
//! [`NoteSubmission`](crate::forms::NoteSubmission).

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use notehub_core::NoteWithRelations;

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::forms::NoteSubmission;
use crate::extract::PathParams;
use crate::{ApiError, AppState};

/// Public feed. No authentication.
#[utoipa::path(get, path = "/api/notes/public", tag = "Notes",
    responses((status = 200, description = "Public notes, newest first", body = Vec<NoteWithRelations>)))]
pub async fn list_public_notes(
    State(state): State<AppState>,
) -> Result<Json<Vec<NoteWithRelations>>, ApiError> {
    Ok(Json(state.note_service().list_public().await?))
}

#[utoipa::path(get, path = "/api/notes", tag = "Notes",
    responses(
        (status = 200, description = "Caller's notes, newest first", body = Vec<NoteWithRelations>),
        (status = 401, description = "Missing or invalid token")))]
pub async fn list_notes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<NoteWithRelations>>, ApiError> {
    Ok(Json(state.note_service().list_own(user.user_id).await?))
}

/// Create a note.
///
/// # Multipart Fields
/// - `title` (required), `content`, `tags`, `is_public`, `course_id`, `group_id`
/// - `attachment`: one image (jpeg, png, gif, webp) or PDF up to 10MB
///
/// # Returns
/// - 201 Created with the note, its course and attachments
/// - 400 Bad Request for a missing title or a rejected file
/// - 403 Forbidden when sharing into a group the caller is not in
#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    responses(
        (status = 201, description = "Note created", body = NoteWithRelations),
        (status = 400, description = "Invalid input or file"),
        (status = 403, description = "Not a member of the target group")))]
pub async fn create_note(
    State(state): State<AppState>,
    user: AuthUser,
    submission: NoteSubmission,
) -> Result<(StatusCode, Json<NoteWithRelations>), ApiError> {
    let note = state.note_service().create(user.user_id, submission).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Update an owned note. A file adds an attachment.
#[utoipa::path(put, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note updated", body = NoteWithRelations),
        (status = 404, description = "Note not found")))]
pub async fn update_note(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(id): PathParams<Uuid>,
    submission: NoteSubmission,
) -> Result<Json<NoteWithRelations>, ApiError> {
    let note = state
        .note_service()
        .update(user.user_id, id, submission)
        .await?;
    Ok(Json(note))
}

#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 404, description = "Note not found")))]
pub async fn delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.note_service().delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("Note deleted successfully")))
}

#[utoipa::path(delete, path = "/api/notes/{note_id}/attachments/{attachment_id}", tag = "Notes",
    params(
        ("note_id" = Uuid, Path, description = "Note id"),
        ("attachment_id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment deleted", body = MessageResponse),
        (status = 404, description = "Note or attachment not found")))]
pub async fn delete_attachment(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams((note_id, attachment_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .note_service()
        .delete_attachment(user.user_id, note_id, attachment_id)
        .await?;
    Ok(Json(MessageResponse::new("Attachment deleted successfully")))
}
