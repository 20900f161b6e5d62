//! Client-side store.
//!
//! Four slices (auth, notes, courses, groups) hold what the UI shows. Each
//! async action marks its slice `Pending`, calls the API, then records either
//! the result (`Fulfilled`) or the error message (`Rejected`).
//!
//! Any request rejected with 401 while logged in resets every slice and
//! returns [`ClientError::SessionExpired`], so the caller can send the user
//! back to the login screen.

mod auth;
mod courses;
mod groups;
mod notes;

pub use auth::AuthState;
pub use courses::CoursesState;
pub use groups::GroupsState;
pub use notes::NotesState;

use tracing::{info, warn};
use uuid::Uuid;

use notehub_core::{CreateCourseRequest, VideoMetadata};

use crate::api::{ApiClient, FileUpload, NoteDraft, Registration};
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionFile};

/// Progress of the last action on a slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl LoadState {
    pub fn is_loading(self) -> bool {
        self == LoadState::Pending
    }
}

/// Which slice an action reports to.
#[derive(Debug, Clone, Copy)]
enum Slice {
    Auth,
    Notes,
    Courses,
    Groups,
}

/// API client plus the slices it keeps up to date.
pub struct Store {
    api: ApiClient,
    session_file: Option<SessionFile>,
    pub auth: AuthState,
    pub notes: NotesState,
    pub courses: CoursesState,
    pub groups: GroupsState,
}

impl Store {
    /// Store with no persisted session.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session_file: None,
            auth: AuthState::default(),
            notes: NotesState::default(),
            courses: CoursesState::default(),
            groups: GroupsState::default(),
        }
    }

    /// Store that restores the session from `file` and keeps it there.
    pub async fn with_session_file(api: ApiClient, file: SessionFile) -> Result<Self> {
        let session = file.load().await?;
        let mut store = Self::new(api);
        store.auth = AuthState::restored(session);
        store.session_file = Some(file);
        Ok(store)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> Option<&Session> {
        self.auth.session.as_ref()
    }

    fn require_session(&self) -> Result<Session> {
        self.auth.session.clone().ok_or(ClientError::NotAuthenticated)
    }

    fn pending(&mut self, slice: Slice) {
        match slice {
            Slice::Auth => self.auth.pending(),
            Slice::Notes => self.notes.pending(),
            Slice::Courses => self.courses.pending(),
            Slice::Groups => self.groups.pending(),
        }
    }

    /// Record a failed action. An expired session logs out everything.
    async fn reject<T>(&mut self, slice: Slice, err: ClientError, fallback: &str) -> Result<T> {
        if matches!(err, ClientError::SessionExpired) {
            warn!(subsystem = "client", component = "store", "Session expired, logging out");
            self.logout().await?;
            return Err(err);
        }

        let message = err.display_message(fallback);
        match slice {
            Slice::Auth => self.auth.rejected(message),
            Slice::Notes => self.notes.rejected(message),
            Slice::Courses => self.courses.rejected(message),
            Slice::Groups => self.groups.rejected(message),
        }
        Err(err)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    pub async fn register(&mut self, registration: &Registration) -> Result<()> {
        self.pending(Slice::Auth);
        match self.api.register(registration).await {
            Ok(_) => {
                self.auth.registered();
                Ok(())
            }
            Err(e) => self.reject(Slice::Auth, e, "Registration failed").await,
        }
    }

    /// Log in and persist the session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.pending(Slice::Auth);
        let session = match self.api.login(email, password).await {
            Ok(session) => session,
            Err(e) => return self.reject(Slice::Auth, e, "Login failed").await,
        };

        if let Some(file) = &self.session_file {
            file.save(&session).await?;
        }
        info!(
            subsystem = "client",
            component = "store",
            user_id = %session.user_id(),
            "Logged in"
        );
        self.auth.logged_in(session);
        Ok(())
    }

    pub async fn fetch_profile(&mut self) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Auth);
        match self.api.profile(&session).await {
            Ok(profile) => {
                self.auth.profile_loaded(profile);
                if let (Some(file), Some(session)) = (&self.session_file, &self.auth.session) {
                    file.save(session).await?;
                }
                Ok(())
            }
            Err(e) => self.reject(Slice::Auth, e, "Failed to fetch profile").await,
        }
    }

    /// Drop the session and every cached entity, so nothing from this user
    /// is visible to the next one.
    pub async fn logout(&mut self) -> Result<()> {
        self.auth.logout();
        self.notes = NotesState::default();
        self.courses = CoursesState::default();
        self.groups = GroupsState::default();
        if let Some(file) = &self.session_file {
            file.clear().await?;
        }
        Ok(())
    }

    // =========================================================================
    // NOTES
    // =========================================================================

    pub async fn fetch_notes(&mut self) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Notes);
        match self.api.list_notes(&session).await {
            Ok(notes) => {
                self.notes.loaded(notes);
                Ok(())
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to fetch notes").await,
        }
    }

    /// Community feed. Works logged out.
    pub async fn fetch_public_notes(&mut self) -> Result<()> {
        self.pending(Slice::Notes);
        match self.api.list_public_notes().await {
            Ok(notes) => {
                self.notes.public_loaded(notes);
                Ok(())
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to fetch public notes").await,
        }
    }

    pub async fn create_note(
        &mut self,
        draft: &NoteDraft,
        file: Option<FileUpload>,
    ) -> Result<Uuid> {
        let session = self.require_session()?;
        self.pending(Slice::Notes);
        match self.api.create_note(&session, draft, file).await {
            Ok(note) => {
                let id = note.note.id;
                self.notes.created(note);
                Ok(id)
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to create note").await,
        }
    }

    pub async fn update_note(
        &mut self,
        note_id: Uuid,
        draft: &NoteDraft,
        file: Option<FileUpload>,
    ) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Notes);
        match self.api.update_note(&session, note_id, draft, file).await {
            Ok(note) => {
                self.notes.updated(note);
                Ok(())
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to update note").await,
        }
    }

    pub async fn delete_note(&mut self, note_id: Uuid) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Notes);
        match self.api.delete_note(&session, note_id).await {
            Ok(()) => {
                self.notes.deleted(note_id);
                Ok(())
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to delete note").await,
        }
    }

    pub async fn delete_attachment(&mut self, note_id: Uuid, attachment_id: Uuid) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Notes);
        match self.api.delete_attachment(&session, note_id, attachment_id).await {
            Ok(()) => {
                self.notes.attachment_deleted(note_id, attachment_id);
                Ok(())
            }
            Err(e) => self.reject(Slice::Notes, e, "Failed to delete attachment").await,
        }
    }

    /// Look up a video for the note editor. Errors are returned, not stored,
    /// since the editor shows them inline.
    pub async fn lookup_video(&mut self, url: &str) -> Result<VideoMetadata> {
        let session = self.require_session()?;
        match self.api.youtube_metadata(&session, url).await {
            Ok(meta) => Ok(meta),
            Err(ClientError::SessionExpired) => {
                self.logout().await?;
                Err(ClientError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // COURSES
    // =========================================================================

    pub async fn fetch_courses(&mut self) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Courses);
        match self.api.list_courses(&session).await {
            Ok(courses) => {
                self.courses.loaded(courses);
                Ok(())
            }
            Err(e) => self.reject(Slice::Courses, e, "Failed to fetch courses").await,
        }
    }

    pub async fn create_course(&mut self, course: &CreateCourseRequest) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Courses);
        match self.api.create_course(&session, course).await {
            Ok(course) => {
                self.courses.created(course);
                Ok(())
            }
            Err(e) => self.reject(Slice::Courses, e, "Failed to create course").await,
        }
    }

    // =========================================================================
    // GROUPS
    // =========================================================================

    pub async fn fetch_groups(&mut self) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Groups);
        match self.api.list_groups(&session).await {
            Ok(groups) => {
                self.groups.loaded(groups);
                Ok(())
            }
            Err(e) => self.reject(Slice::Groups, e, "Failed to fetch groups").await,
        }
    }

    pub async fn create_group(&mut self, name: &str, description: Option<&str>) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Groups);
        match self.api.create_group(&session, name, description).await {
            Ok(group) => {
                self.groups.created(group);
                Ok(())
            }
            Err(e) => self.reject(Slice::Groups, e, "Failed to create group").await,
        }
    }

    /// Load a group's details and its shared notes.
    pub async fn open_group(&mut self, group_id: Uuid) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Groups);
        let details = match self.api.get_group(&session, group_id).await {
            Ok(details) => details,
            Err(e) => return self.reject(Slice::Groups, e, "Failed to fetch group").await,
        };
        self.groups.details_loaded(details);

        match self.api.list_group_notes(&session, group_id).await {
            Ok(notes) => {
                self.groups.notes_loaded(notes);
                Ok(())
            }
            Err(e) => self.reject(Slice::Groups, e, "Failed to fetch group notes").await,
        }
    }

    pub async fn invite_member(&mut self, group_id: Uuid, email: &str) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Groups);
        match self.api.invite_member(&session, group_id, email).await {
            Ok(member) => {
                self.groups.member_added(group_id, member);
                Ok(())
            }
            Err(e) => self.reject(Slice::Groups, e, "Failed to invite member").await,
        }
    }

    pub async fn remove_member(&mut self, group_id: Uuid, member_id: Uuid) -> Result<()> {
        let session = self.require_session()?;
        self.pending(Slice::Groups);
        match self.api.remove_member(&session, group_id, member_id).await {
            Ok(()) => {
                self.groups.member_removed(group_id, member_id);
                Ok(())
            }
            Err(e) => self.reject(Slice::Groups, e, "Failed to remove member").await,
        }
    }
}
