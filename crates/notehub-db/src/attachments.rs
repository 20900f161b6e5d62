//! Attachment repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use notehub_core::{new_id, Attachment, AttachmentRepository, Error, NewAttachment, Result};

const ATTACHMENT_COLUMNS: &str = "id, note_id, file_url, file_type, original_name, created_at";

/// PostgreSQL implementation of AttachmentRepository.
pub struct PgAttachmentRepository {
    pool: Pool<Postgres>,
}

impl PgAttachmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_row_to_attachment(row: &PgRow) -> Result<Attachment> {
    let file_type: String = row.get("file_type");
    Ok(Attachment {
        id: row.get("id"),
        note_id: row.get("note_id"),
        file_url: row.get("file_url"),
        file_type: file_type.parse().map_err(Error::Internal)?,
        original_name: row.get("original_name"),
        created_at: row.get("created_at"),
    })
}

/// Attachments for a set of notes in one round-trip.
pub(crate) async fn fetch_for_notes<'e, E>(executor: E, note_ids: &[Uuid]) -> Result<Vec<Attachment>>
where
    E: Executor<'e, Database = Postgres>,
{
    if note_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query(&format!(
        "SELECT {} FROM attachments WHERE note_id = ANY($1) ORDER BY created_at, id",
        ATTACHMENT_COLUMNS
    ))
    .bind(note_ids)
    .fetch_all(executor)
    .await
    .map_err(Error::Database)?;

    rows.iter().map(map_row_to_attachment).collect()
}

/// Delete a note's attachment rows, returning them.
pub(crate) async fn remove_for_note<'e, E>(executor: E, note_id: Uuid) -> Result<Vec<Attachment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query(&format!(
        "DELETE FROM attachments WHERE note_id = $1 RETURNING {}",
        ATTACHMENT_COLUMNS
    ))
    .bind(note_id)
    .fetch_all(executor)
    .await
    .map_err(Error::Database)?;

    rows.iter().map(map_row_to_attachment).collect()
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn insert(&self, attachment: NewAttachment) -> Result<Attachment> {
        let row = sqlx::query(&format!(
            "INSERT INTO attachments (id, note_id, file_url, file_type, original_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            ATTACHMENT_COLUMNS
        ))
        .bind(new_id())
        .bind(attachment.note_id)
        .bind(&attachment.file_url)
        .bind(attachment.file_type.as_str())
        .bind(&attachment.original_name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_row_to_attachment(&row)
    }

    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Attachment>> {
        fetch_for_notes(&self.pool, &[note_id]).await
    }

    async fn delete_owned(
        &self,
        note_id: Uuid,
        attachment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Attachment>> {
        let row = sqlx::query(
            "DELETE FROM attachments a
             USING notes n
             WHERE a.id = $1 AND a.note_id = $2 AND n.id = a.note_id AND n.user_id = $3
             RETURNING a.id, a.note_id, a.file_url, a.file_type, a.original_name, a.created_at",
        )
        .bind(attachment_id)
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_row_to_attachment).transpose()
    }
}
