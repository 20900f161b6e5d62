//! Typed HTTP client for the NoteHub REST API.
//!
//! Every authenticated call takes the [`Session`] explicitly. A 401 on such a
//! call comes back as [`ClientError::SessionExpired`]; a 401 on an anonymous
//! call (bad login) is an ordinary [`ClientError::Api`].

use std::time::{Duration, Instant};

use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use notehub_core::defaults::ATTACHMENT_FIELD;
use notehub_core::{
    Course, CreateCourseRequest, GroupDetails, MemberInfo, NoteWithRelations, PublicUser,
    StudyGroup, UserGroups, UserSummary, VideoMetadata,
};

use crate::error::{ClientError, Result};
use crate::session::Session;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
    user: UserSummary,
}

/// Registration form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Editable note fields, sent whole on create and update.
///
/// `None` ids are sent as null, which clears them on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub course_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}

impl NoteDraft {
    /// Draft prefilled from an existing note, for editing.
    pub fn from_note(note: &NoteWithRelations) -> Self {
        Self {
            title: note.note.title.clone(),
            content: note.note.content.clone(),
            tags: note.note.tags.clone(),
            is_public: note.note.is_public,
            course_id: note.note.course_id,
            group_id: note.note.group_id,
        }
    }

    fn into_form(self, file: FileUpload) -> Result<multipart::Form> {
        let id_field = |id: Option<Uuid>| id.map(|id| id.to_string()).unwrap_or_default();
        let part = multipart::Part::bytes(file.data)
            .file_name(file.filename)
            .mime_str(&file.content_type)?;

        Ok(multipart::Form::new()
            .text("title", self.title)
            .text("content", self.content)
            .text("tags", serde_json::to_string(&self.tags)?)
            .text("is_public", self.is_public.to_string())
            .text("course_id", id_field(self.course_id))
            .text("group_id", id_field(self.group_id))
            .part(ATTACHMENT_FIELD, part))
    }
}

/// A file to attach to a note.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// NoteHub API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Client for a server root such as `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server-relative path such as an attachment's
    /// `/uploads/...` link.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// Send and map error statuses to [`ClientError`].
    async fn execute(
        &self,
        op: &'static str,
        builder: RequestBuilder,
        authenticated: bool,
    ) -> Result<Response> {
        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        debug!(
            subsystem = "client",
            component = "api",
            op,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "API call finished"
        );

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED && authenticated {
            warn!(subsystem = "client", component = "api", op, "Session rejected by server");
            return Err(ClientError::SessionExpired);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        op: &'static str,
        builder: RequestBuilder,
        authenticated: bool,
    ) -> Result<T> {
        Ok(self.execute(op, builder, authenticated).await?.json().await?)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Create an account. Returns the server's confirmation message.
    pub async fn register(&self, registration: &Registration) -> Result<String> {
        let builder = self
            .request(Method::POST, "/auth/register", None)
            .json(registration);
        let body: MessageBody = self.fetch("register", builder, false).await?;
        Ok(body.message)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let builder = self
            .request(Method::POST, "/auth/login", None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let body: LoginBody = self.fetch("login", builder, false).await?;
        Ok(Session::new(body.token, body.user))
    }

    pub async fn profile(&self, session: &Session) -> Result<PublicUser> {
        let builder = self.request(Method::GET, "/auth/profile", Some(session));
        self.fetch("profile", builder, true).await
    }

    // =========================================================================
    // NOTES
    // =========================================================================

    pub async fn list_notes(&self, session: &Session) -> Result<Vec<NoteWithRelations>> {
        let builder = self.request(Method::GET, "/notes", Some(session));
        self.fetch("list_notes", builder, true).await
    }

    /// Community feed. Sent without credentials.
    pub async fn list_public_notes(&self) -> Result<Vec<NoteWithRelations>> {
        let builder = self.request(Method::GET, "/notes/public", None);
        self.fetch("list_public_notes", builder, false).await
    }

    /// JSON body without a file, multipart form with one.
    fn note_body(
        builder: RequestBuilder,
        draft: &NoteDraft,
        file: Option<FileUpload>,
    ) -> Result<RequestBuilder> {
        Ok(match file {
            Some(file) => builder.multipart(draft.clone().into_form(file)?),
            None => builder.json(draft),
        })
    }

    pub async fn create_note(
        &self,
        session: &Session,
        draft: &NoteDraft,
        file: Option<FileUpload>,
    ) -> Result<NoteWithRelations> {
        let builder = self.request(Method::POST, "/notes", Some(session));
        let builder = Self::note_body(builder, draft, file)?;
        self.fetch("create_note", builder, true).await
    }

    pub async fn update_note(
        &self,
        session: &Session,
        note_id: Uuid,
        draft: &NoteDraft,
        file: Option<FileUpload>,
    ) -> Result<NoteWithRelations> {
        let builder = self.request(Method::PUT, &format!("/notes/{}", note_id), Some(session));
        let builder = Self::note_body(builder, draft, file)?;
        self.fetch("update_note", builder, true).await
    }

    pub async fn delete_note(&self, session: &Session, note_id: Uuid) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/notes/{}", note_id), Some(session));
        self.execute("delete_note", builder, true).await?;
        Ok(())
    }

    pub async fn delete_attachment(
        &self,
        session: &Session,
        note_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<()> {
        let path = format!("/notes/{}/attachments/{}", note_id, attachment_id);
        let builder = self.request(Method::DELETE, &path, Some(session));
        self.execute("delete_attachment", builder, true).await?;
        Ok(())
    }

    // =========================================================================
    // COURSES
    // =========================================================================

    pub async fn list_courses(&self, session: &Session) -> Result<Vec<Course>> {
        let builder = self.request(Method::GET, "/courses", Some(session));
        self.fetch("list_courses", builder, true).await
    }

    pub async fn create_course(
        &self,
        session: &Session,
        course: &CreateCourseRequest,
    ) -> Result<Course> {
        let builder = self
            .request(Method::POST, "/courses", Some(session))
            .json(course);
        self.fetch("create_course", builder, true).await
    }

    // =========================================================================
    // GROUPS
    // =========================================================================

    pub async fn list_groups(&self, session: &Session) -> Result<UserGroups> {
        let builder = self.request(Method::GET, "/groups", Some(session));
        self.fetch("list_groups", builder, true).await
    }

    pub async fn create_group(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<StudyGroup> {
        let builder = self
            .request(Method::POST, "/groups", Some(session))
            .json(&serde_json::json!({ "name": name, "description": description }));
        self.fetch("create_group", builder, true).await
    }

    pub async fn get_group(&self, session: &Session, group_id: Uuid) -> Result<GroupDetails> {
        let builder = self.request(Method::GET, &format!("/groups/{}", group_id), Some(session));
        self.fetch("get_group", builder, true).await
    }

    pub async fn list_group_notes(
        &self,
        session: &Session,
        group_id: Uuid,
    ) -> Result<Vec<NoteWithRelations>> {
        let path = format!("/groups/{}/notes", group_id);
        let builder = self.request(Method::GET, &path, Some(session));
        self.fetch("list_group_notes", builder, true).await
    }

    pub async fn invite_member(
        &self,
        session: &Session,
        group_id: Uuid,
        email: &str,
    ) -> Result<MemberInfo> {
        let path = format!("/groups/{}/invite", group_id);
        let builder = self
            .request(Method::POST, &path, Some(session))
            .json(&serde_json::json!({ "email": email }));
        self.fetch("invite_member", builder, true).await
    }

    pub async fn remove_member(
        &self,
        session: &Session,
        group_id: Uuid,
        member_id: Uuid,
    ) -> Result<()> {
        let path = format!("/groups/{}/members/{}", group_id, member_id);
        let builder = self.request(Method::DELETE, &path, Some(session));
        self.execute("remove_member", builder, true).await?;
        Ok(())
    }

    // =========================================================================
    // EXTERNAL
    // =========================================================================

    pub async fn youtube_metadata(&self, session: &Session, url: &str) -> Result<VideoMetadata> {
        let builder = self
            .request(Method::POST, "/external/youtube", Some(session))
            .json(&serde_json::json!({ "url": url }));
        self.fetch("youtube_metadata", builder, true).await
    }
}
