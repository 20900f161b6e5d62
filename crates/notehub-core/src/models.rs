//! Core data models for NoteHub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USERS
// =============================================================================

/// A registered user as stored.
///
/// The password hash never leaves the server: it is skipped on serialization
/// and the API only ever returns [`PublicUser`] or [`UserSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// User record minus the password hash (profile responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Compact user shape returned by login and group admin lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

/// Owner display info joined onto public and group notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OwnerRef {
    pub id: Uuid,
    pub full_name: String,
}

/// Input for inserting a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}

// =============================================================================
// COURSES
// =============================================================================

/// A university course notes can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub semester: Option<i32>,
    pub teacher_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Course name joined onto a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseRef {
    pub name: String,
}

/// Request for creating a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CreateCourseRequest {
    pub name: String,
    pub semester: Option<i32>,
    pub teacher_name: Option<String>,
}

// =============================================================================
// NOTES
// =============================================================================

/// A user-authored markdown note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub user_id: Uuid,
    pub course_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note joined with its course name, owner and attachments.
///
/// `owner` is only populated by listings that show other people's notes
/// (public feed, group notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteWithRelations {
    #[serde(flatten)]
    pub note: Note,
    pub course: Option<CourseRef>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<OwnerRef>,
    pub attachments: Vec<Attachment>,
}

/// Request for creating a note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub course_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}

/// Partial update of a note. `None` leaves a field untouched.
///
/// The doubly-optional ids distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub course_id: Option<Option<Uuid>>,
    pub group_id: Option<Option<Uuid>>,
}

impl UpdateNoteRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Attachment classification, derived from the upload's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// `image/*` is an image; everything else that passed the allow-list is a PDF.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            FileKind::Image
        } else {
            FileKind::Pdf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileKind::Image),
            "pdf" => Ok(FileKind::Pdf),
            other => Err(format!("Unknown file type: {}", other)),
        }
    }
}

/// A file bound to exactly one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Attachment {
    pub id: Uuid,
    pub note_id: Uuid,
    pub file_url: String,
    pub file_type: FileKind,
    pub original_name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting an attachment row after the file is stored.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub note_id: Uuid,
    pub file_url: String,
    pub file_type: FileKind,
    pub original_name: String,
}

// =============================================================================
// STUDY GROUPS
// =============================================================================

/// A named collection of users with one admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudyGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub admin_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Membership row linking a user to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GroupMember {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Public fields of a group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MemberInfo {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

/// Group detail view, annotated with whether the caller administers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GroupDetails {
    pub group: StudyGroup,
    pub admin: UserSummary,
    pub members: Vec<MemberInfo>,
    pub is_admin: bool,
}

/// Groups a user administers and groups they only belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserGroups {
    #[serde(rename = "adminOf")]
    pub admin_of: Vec<StudyGroup>,
    #[serde(rename = "memberOf")]
    pub member_of: Vec<StudyGroup>,
}

/// Request for creating a group.
#[derive(Debug, Clone)]
pub struct CreateGroupRequest {
    pub admin_user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// EXTERNAL METADATA
// =============================================================================

/// Normalized metadata for an external video.
///
/// This is also the JSON payload carried by an inline video reference marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub author_url: String,
    pub thumbnail_url: String,
    pub url: String,
}
