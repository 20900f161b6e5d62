//! Note authoring: create, update, delete and attachment handling.
//!
//! ## Ordering
//!
//! Uploads are validated before anything is written. On create the note row
//! comes first, then the file, then the attachment row; a failure after the
//! note row exists removes the note again. Deletions remove rows in one
//! transaction and clean up files afterwards, tolerating files that are
//! already gone.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use notehub_core::{
    require_field, sanitize_filename, validate_upload, Attachment, AttachmentRepository,
    CheckedUpload, CreateNoteRequest, Error, GroupRepository, NewAttachment, NoteRepository,
    NoteWithRelations, Result, UpdateNoteRequest,
};
use notehub_db::{Database, UploadStore};

use crate::forms::{NoteSubmission, UploadedFile};

const NOTE_NOT_FOUND: &str = "Note not found";

#[derive(Clone)]
pub struct NoteService {
    db: Database,
    uploads: UploadStore,
    max_upload_bytes: usize,
}

impl NoteService {
    pub fn new(db: Database, uploads: UploadStore, max_upload_bytes: usize) -> Self {
        Self {
            db,
            uploads,
            max_upload_bytes,
        }
    }

    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<NoteWithRelations>> {
        let notes = self.db.notes.list_by_owner(user_id).await?;
        debug!(
            subsystem = "api",
            component = "notes",
            op = "list_own",
            user_id = %user_id,
            result_count = notes.len(),
            "Listed own notes"
        );
        Ok(notes)
    }

    pub async fn list_public(&self) -> Result<Vec<NoteWithRelations>> {
        self.db.notes.list_public().await
    }

    /// Create a note owned by `user_id`, optionally with one attachment.
    pub async fn create(&self, user_id: Uuid, sub: NoteSubmission) -> Result<NoteWithRelations> {
        let start = Instant::now();

        let title = require_field(sub.title.as_deref(), "Title is required")?.to_string();
        let upload = self.check_upload(sub.attachment)?;

        let group_id = sub.group_id.flatten();
        if let Some(group_id) = group_id {
            self.ensure_group_member(group_id, user_id).await?;
        }

        let note = self
            .db
            .notes
            .insert(CreateNoteRequest {
                user_id,
                title,
                content: sub.content.unwrap_or_default(),
                tags: sub.tags.unwrap_or_default(),
                is_public: sub.is_public.unwrap_or(false),
                course_id: sub.course_id.flatten(),
                group_id,
            })
            .await?;

        if let Some((file, checked)) = upload {
            if let Err(e) = self.attach(note.id, file, checked).await {
                // Do not leave a note behind for a request that failed.
                if let Err(cleanup) = self.db.notes.delete_owned(note.id, user_id).await {
                    warn!(
                        subsystem = "api",
                        component = "notes",
                        op = "create",
                        note_id = %note.id,
                        error = %cleanup,
                        "Failed to roll back note after attachment error"
                    );
                }
                return Err(e);
            }
        }

        info!(
            subsystem = "api",
            component = "notes",
            op = "create",
            user_id = %user_id,
            note_id = %note.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note created"
        );
        self.fetch(note.id).await
    }

    /// Apply the supplied fields to an owned note. A file adds an attachment;
    /// existing attachments are kept.
    pub async fn update(
        &self,
        user_id: Uuid,
        note_id: Uuid,
        sub: NoteSubmission,
    ) -> Result<NoteWithRelations> {
        let current = self
            .db
            .notes
            .fetch_owned(note_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(NOTE_NOT_FOUND.to_string()))?;

        let title = match sub.title {
            Some(t) if t.trim().is_empty() => {
                return Err(Error::InvalidInput("Title cannot be empty".to_string()))
            }
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        let upload = self.check_upload(sub.attachment)?;

        // Membership is only checked when the note moves into a group. An
        // author who left a group can still edit notes already shared there.
        if let Some(Some(group_id)) = sub.group_id {
            if current.group_id != Some(group_id) {
                self.ensure_group_member(group_id, user_id).await?;
            }
        }

        let changes = UpdateNoteRequest {
            title,
            content: sub.content,
            tags: sub.tags,
            is_public: sub.is_public,
            course_id: sub.course_id,
            group_id: sub.group_id,
        };
        if !changes.is_empty() {
            self.db.notes.update(note_id, changes).await?;
        }

        if let Some((file, checked)) = upload {
            self.attach(note_id, file, checked).await?;
        }

        info!(
            subsystem = "api",
            component = "notes",
            op = "update",
            user_id = %user_id,
            note_id = %note_id,
            "Note updated"
        );
        self.fetch(note_id).await
    }

    /// Delete an owned note with all its attachments.
    pub async fn delete(&self, user_id: Uuid, note_id: Uuid) -> Result<()> {
        let removed = self
            .db
            .notes
            .delete_owned(note_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(NOTE_NOT_FOUND.to_string()))?;

        let mut files_failed = 0usize;
        for attachment in &removed {
            if !self.uploads.remove_url(&attachment.file_url).await {
                files_failed += 1;
            }
        }

        info!(
            subsystem = "api",
            component = "notes",
            op = "delete",
            user_id = %user_id,
            note_id = %note_id,
            attachments = removed.len(),
            files_failed,
            "Note deleted"
        );
        Ok(())
    }

    /// Delete one attachment of an owned note.
    pub async fn delete_attachment(
        &self,
        user_id: Uuid,
        note_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<()> {
        if self.db.notes.fetch_owned(note_id, user_id).await?.is_none() {
            return Err(Error::NotFound(NOTE_NOT_FOUND.to_string()));
        }

        let removed = self
            .db
            .attachments
            .delete_owned(note_id, attachment_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Attachment not found".to_string()))?;
        self.uploads.remove_url(&removed.file_url).await;

        info!(
            subsystem = "api",
            component = "notes",
            op = "delete_attachment",
            user_id = %user_id,
            note_id = %note_id,
            attachment_id = %attachment_id,
            "Attachment deleted"
        );
        Ok(())
    }

    async fn fetch(&self, note_id: Uuid) -> Result<NoteWithRelations> {
        self.db
            .notes
            .fetch_with_relations(note_id)
            .await?
            .ok_or_else(|| Error::NotFound(NOTE_NOT_FOUND.to_string()))
    }

    fn check_upload(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<Option<(UploadedFile, CheckedUpload)>> {
        match file {
            Some(file) => {
                let checked =
                    validate_upload(&file.content_type, &file.data, self.max_upload_bytes)?;
                Ok(Some((file, checked)))
            }
            None => Ok(None),
        }
    }

    /// Notes may only be shared into groups the author belongs to.
    async fn ensure_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<()> {
        if self.db.groups.fetch(group_id).await?.is_none() {
            return Err(Error::NotFound("Group not found".to_string()));
        }
        if !self.db.groups.is_member(group_id, user_id).await? {
            return Err(Error::Forbidden(
                "You are not a member of this group".to_string(),
            ));
        }
        Ok(())
    }

    async fn attach(
        &self,
        note_id: Uuid,
        file: UploadedFile,
        checked: CheckedUpload,
    ) -> Result<Attachment> {
        let stored = self.uploads.save(&file.data, &checked.extension).await?;
        let inserted = self
            .db
            .attachments
            .insert(NewAttachment {
                note_id,
                file_url: stored.url.clone(),
                file_type: checked.kind,
                original_name: sanitize_filename(&file.filename),
            })
            .await;

        match inserted {
            Ok(attachment) => {
                debug!(
                    subsystem = "api",
                    component = "notes",
                    op = "attach",
                    note_id = %note_id,
                    file_size = file.data.len(),
                    file_type = %checked.kind,
                    "Stored attachment"
                );
                Ok(attachment)
            }
            Err(e) => {
                self.uploads.remove_url(&stored.url).await;
                Err(e)
            }
        }
    }
}
