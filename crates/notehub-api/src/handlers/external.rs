//! External metadata lookup.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use notehub_core::VideoMetadata;

use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::{ApiError, AppState};

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VideoLookupRequest {
    #[serde(default)]
    pub url: String,
}

/// Resolve a video link to its title, author and thumbnail.
///
/// # Returns
/// - 200 OK with normalized metadata
/// - 400 Bad Request if the URL is missing or not a recognized video link
/// - 404 Not Found if the video is unknown or private
/// - 502 Bad Gateway for any other upstream failure
#[utoipa::path(post, path = "/api/external/youtube", tag = "External",
    request_body = VideoLookupRequest,
    responses(
        (status = 200, description = "Video metadata", body = VideoMetadata),
        (status = 400, description = "Invalid URL"),
        (status = 404, description = "Video not found or private"),
        (status = 502, description = "Upstream failure")))]
pub async fn youtube_metadata(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(req): JsonBody<VideoLookupRequest>,
) -> Result<Json<VideoMetadata>, ApiError> {
    let meta = notehub_external::fetch_video_metadata(state.video.as_ref(), &req.url).await?;
    Ok(Json(meta))
}
