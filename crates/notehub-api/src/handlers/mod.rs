//! HTTP handlers, one module per resource.

pub mod auth;
pub mod courses;
pub mod external;
pub mod groups;
pub mod health;
pub mod notes;

use serde::{Deserialize, Serialize};

/// Body of responses that only confirm an action.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
