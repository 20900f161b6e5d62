//! # notehub-core
//!
//! Core types, traits, and shared rules for NoteHub.
//!
//! This crate holds the data model, repository traits, and the pure logic
//! (tag parsing, upload checks, video references, validation) used by both
//! the server crates and the client crate.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod models;
pub mod tags;
pub mod traits;
pub mod validation;
pub mod video;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::{sanitize_filename, validate_upload, CheckedUpload};
pub use models::*;
pub use tags::{normalize_tags, parse_tags, tags_from_json};
pub use traits::*;
pub use validation::{is_institutional_email, is_valid_email, normalize_email, require_field};
pub use video::{extract_markers, extract_video_id, strip_markers, watch_url};

/// Generate a new time-ordered UUID for primary keys.
pub fn new_id() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
