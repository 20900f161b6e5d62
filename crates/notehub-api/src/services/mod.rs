//! Service layer for business logic.
//!
//! Services enforce ownership, membership and validation rules on top of the
//! repositories and return domain errors; handlers turn those into HTTP
//! responses.

pub mod auth_service;
pub mod course_service;
pub mod group_service;
pub mod note_service;

pub use auth_service::{AuthService, LoginRequest, LoginResponse, RegisterRequest};
pub use course_service::CourseService;
pub use group_service::GroupService;
pub use note_service::NoteService;

use crate::AppState;

impl AppState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.db.clone(),
            self.passwords.clone(),
            self.tokens.clone(),
            self.config.institution_domain.clone(),
        )
    }

    pub fn note_service(&self) -> NoteService {
        NoteService::new(
            self.db.clone(),
            self.uploads.clone(),
            self.config.max_upload_bytes,
        )
    }

    pub fn course_service(&self) -> CourseService {
        CourseService::new(self.db.clone())
    }

    pub fn group_service(&self) -> GroupService {
        GroupService::new(self.db.clone())
    }
}
