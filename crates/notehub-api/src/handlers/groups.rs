//! Study group handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notehub_core::{GroupDetails, MemberInfo, NoteWithRelations, StudyGroup, UserGroups};

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::extract::{JsonBody, PathParams};
use crate::{ApiError, AppState};

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateGroupBody {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct InviteBody {
    #[serde(default)]
    pub email: String,
}

#[utoipa::path(get, path = "/api/groups", tag = "Groups",
    responses((status = 200, description = "Groups administered and joined", body = UserGroups)))]
pub async fn list_groups(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserGroups>, ApiError> {
    Ok(Json(state.group_service().list_for_user(user.user_id).await?))
}

/// Create a group administered by the caller, who also becomes its first member.
#[utoipa::path(post, path = "/api/groups", tag = "Groups",
    request_body = CreateGroupBody,
    responses(
        (status = 201, description = "Group created", body = StudyGroup),
        (status = 400, description = "Name missing")))]
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateGroupBody>,
) -> Result<(StatusCode, Json<StudyGroup>), ApiError> {
    let group = state
        .group_service()
        .create(user.user_id, &body.name, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(get, path = "/api/groups/{id}", tag = "Groups",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group, admin and members", body = GroupDetails),
        (status = 403, description = "Not a member"),
        (status = 404, description = "Group not found")))]
pub async fn get_group(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<GroupDetails>, ApiError> {
    Ok(Json(state.group_service().details(user.user_id, id).await?))
}

#[utoipa::path(get, path = "/api/groups/{id}/notes", tag = "Groups",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Notes shared into the group", body = Vec<NoteWithRelations>),
        (status = 403, description = "Not a member"),
        (status = 404, description = "Group not found")))]
pub async fn list_group_notes(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<Vec<NoteWithRelations>>, ApiError> {
    Ok(Json(state.group_service().list_notes(user.user_id, id).await?))
}

/// Add a registered user to the group by email. Admin only.
#[utoipa::path(post, path = "/api/groups/{id}/invite", tag = "Groups",
    params(("id" = Uuid, Path, description = "Group id")),
    request_body = InviteBody,
    responses(
        (status = 201, description = "Member added", body = MemberInfo),
        (status = 403, description = "Caller is not the admin"),
        (status = 404, description = "Group or user not found"),
        (status = 409, description = "Already a member")))]
pub async fn invite_member(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(id): PathParams<Uuid>,
    JsonBody(body): JsonBody<InviteBody>,
) -> Result<(StatusCode, Json<MemberInfo>), ApiError> {
    let member = state
        .group_service()
        .invite(user.user_id, id, &body.email)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(delete, path = "/api/groups/{id}/members/{member_id}", tag = "Groups",
    params(
        ("id" = Uuid, Path, description = "Group id"),
        ("member_id" = Uuid, Path, description = "User id of the member")),
    responses(
        (status = 200, description = "Member removed", body = MessageResponse),
        (status = 400, description = "The admin cannot be removed"),
        (status = 403, description = "Caller is not the admin"),
        (status = 404, description = "Group not found")))]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams((id, member_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .group_service()
        .remove_member(user.user_id, id, member_id)
        .await?;
    Ok(Json(MessageResponse::new("Member removed successfully")))
}
