//! Request extractors that reject with [`ApiError`].
//!
//! axum's own `Json` and `Path` answer malformed input with a plain-text body
//! and, for JSON, status 422. These wrappers keep every client error in the
//! `{"error": ...}` shape with status 400.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::ApiError;

pub const INVALID_PATH_MESSAGE: &str = "Invalid id in URL";

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

/// Typed path parameters, usually one or two ids.
#[derive(Debug, Clone, Copy)]
pub struct PathParams<T>(pub T);

pub(crate) fn json_rejection(err: JsonRejection) -> ApiError {
    match err {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::BadRequest("Expected a JSON request body".to_string())
        }
        other => ApiError::BadRequest(other.body_text()),
    }
}

fn path_rejection(err: PathRejection) -> ApiError {
    match err {
        PathRejection::FailedToDeserializePathParams(_) => {
            ApiError::BadRequest(INVALID_PATH_MESSAGE.to_string())
        }
        other => ApiError::Internal(notehub_core::Error::Internal(other.body_text())),
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(JsonBody(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;
        Ok(PathParams(value))
    }
}
