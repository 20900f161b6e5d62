//! Core traits for NoteHub.
//!
//! Repositories are implemented over PostgreSQL in `notehub-db`; the video
//! metadata provider is implemented in `notehub-external`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email yields `Error::Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Look up a user by (case-insensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fetch a user by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<User>>;

    /// List every user, oldest first.
    async fn list_all(&self) -> Result<Vec<User>>;
}

// =============================================================================
// COURSE REPOSITORY
// =============================================================================

/// Repository for courses.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// List all courses ordered by name.
    async fn list(&self) -> Result<Vec<Course>>;

    /// Insert a course.
    async fn insert(&self, req: CreateCourseRequest) -> Result<Course>;

    /// Return the course with this name, creating it when absent.
    /// The boolean is true when a row was created.
    async fn find_or_create_by_name(&self, name: &str) -> Result<(Course, bool)>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note only if `user_id` owns it.
    async fn fetch_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>>;

    /// Fetch a note with course name and attachments, without an ownership check.
    async fn fetch_with_relations(&self, id: Uuid) -> Result<Option<NoteWithRelations>>;

    /// The caller's own notes, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<NoteWithRelations>>;

    /// Every public note with owner display info, newest first.
    async fn list_public(&self) -> Result<Vec<NoteWithRelations>>;

    /// Notes shared into a group with owner display info, newest first.
    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<NoteWithRelations>>;

    /// Apply a partial update. Bumps `updated_at`.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Delete a note the caller owns together with its attachment rows in one
    /// transaction. Returns the removed attachments so their files can be
    /// cleaned up, or `None` when there was nothing to delete.
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Vec<Attachment>>>;
}

// =============================================================================
// ATTACHMENT REPOSITORY
// =============================================================================

/// Repository for note attachments.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Record an attachment whose file is already stored.
    async fn insert(&self, attachment: NewAttachment) -> Result<Attachment>;

    /// Attachments for a single note, oldest first.
    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Attachment>>;

    /// Delete one attachment if it belongs to `note_id` and that note is owned
    /// by `user_id`. Returns the removed row.
    async fn delete_owned(
        &self,
        note_id: Uuid,
        attachment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Attachment>>;
}

// =============================================================================
// GROUP REPOSITORY
// =============================================================================

/// Repository for study groups and their membership.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Create a group and enroll its admin as a member in one transaction.
    async fn create(&self, req: CreateGroupRequest) -> Result<StudyGroup>;

    /// Fetch a group by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<StudyGroup>>;

    /// True when the user has a membership row in the group.
    async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Groups administered by the user.
    async fn list_admin_of(&self, user_id: Uuid) -> Result<Vec<StudyGroup>>;

    /// Groups the user belongs to but does not administer.
    async fn list_member_of(&self, user_id: Uuid) -> Result<Vec<StudyGroup>>;

    /// Members with their public fields, in join order.
    async fn members(&self, group_id: Uuid) -> Result<Vec<MemberInfo>>;

    /// Add a membership row. An existing membership yields `Error::Conflict`.
    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupMember>;

    /// Remove a membership row. Returns false when there was none.
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool>;
}

// =============================================================================
// EXTERNAL METADATA
// =============================================================================

/// Source of normalized video metadata.
///
/// Implementations map "video unknown or private" to `Error::NotFound` and any
/// other upstream failure to `Error::Upstream`.
#[async_trait]
pub trait VideoMetadataProvider: Send + Sync {
    /// Fetch metadata for an already-extracted video id.
    async fn fetch_by_id(&self, video_id: &str) -> Result<VideoMetadata>;
}
