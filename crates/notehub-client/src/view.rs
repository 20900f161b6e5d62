//! Helpers for whatever renders the store: filtering, video cards and
//! registration checks.

use uuid::Uuid;

use notehub_core::video::append_marker;
use notehub_core::validation::validate_registration;
use notehub_core::{extract_markers, strip_markers, NoteWithRelations, VideoMetadata};

use crate::error::Result;

/// Note list filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilters {
    pub course_id: Option<Uuid>,
    pub search_query: String,
    /// A note must carry every tag listed here.
    pub tags: Vec<String>,
}

impl NoteFilters {
    pub fn is_empty(&self) -> bool {
        self.course_id.is_none() && self.search_query.trim().is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, note: &NoteWithRelations) -> bool {
        let query = self.search_query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || note.note.title.to_lowercase().contains(&query)
            || note.note.content.to_lowercase().contains(&query);

        let matches_course = self
            .course_id
            .map_or(true, |id| note.note.course_id == Some(id));

        let matches_tags = self.tags.iter().all(|wanted| {
            note.note
                .tags
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(wanted))
        });

        matches_query && matches_course && matches_tags
    }
}

/// Notes passing `filters`, in their original order.
pub fn filter_notes<'a>(
    notes: &'a [NoteWithRelations],
    filters: &NoteFilters,
) -> Vec<&'a NoteWithRelations> {
    notes.iter().filter(|n| filters.matches(n)).collect()
}

/// Video cards to render for a note body.
pub fn video_cards(content: &str) -> Vec<VideoMetadata> {
    extract_markers(content)
}

/// Note body ready for markdown rendering, with video markers removed.
pub fn cleaned_content(content: &str) -> String {
    strip_markers(content)
}

/// Add a video reference to a note body being composed.
pub fn insert_video(content: &str, video: &VideoMetadata) -> Result<String> {
    Ok(append_marker(content, video)?)
}

/// Registration form check run before anything is sent.
///
/// The server applies the same rules; this only saves a round trip.
pub fn check_registration(
    email: &str,
    password: &str,
    full_name: &str,
    institution_domain: Option<&str>,
) -> Result<()> {
    validate_registration(email, password, full_name, institution_domain)?;
    Ok(())
}
