//! Note repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use notehub_core::{
    new_id, Attachment, CourseRef, CreateNoteRequest, Error, Note, NoteRepository,
    NoteWithRelations, OwnerRef, Result, UpdateNoteRequest,
};

use crate::attachments::{fetch_for_notes, remove_for_note};

const NOTE_COLUMNS: &str =
    "id, title, content, tags, is_public, user_id, course_id, group_id, created_at, updated_at";

/// Joined listing query. `{filter}` is replaced with the WHERE clause.
const LIST_QUERY: &str = "SELECT n.id, n.title, n.content, n.tags, n.is_public, n.user_id,
        n.course_id, n.group_id, n.created_at, n.updated_at,
        c.name AS course_name, u.full_name AS owner_name
     FROM notes n
     JOIN users u ON u.id = n.user_id
     LEFT JOIN courses c ON c.id = n.course_id
     WHERE {filter}
     ORDER BY n.created_at DESC, n.id DESC";

/// Which relations a listing carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerVisibility {
    Hidden,
    Shown,
}

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        filter: &str,
        bind: Option<Uuid>,
        owner: OwnerVisibility,
    ) -> Result<Vec<NoteWithRelations>> {
        let sql = LIST_QUERY.replace("{filter}", filter);
        let mut query = sqlx::query(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;

        let note_ids: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();
        let attachments = fetch_for_notes(&self.pool, &note_ids).await?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            result_count = rows.len(),
            attachment_count = attachments.len(),
            "Listed notes"
        );

        Ok(assemble(rows, attachments, owner))
    }
}

fn map_row_to_note(row: &PgRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: row.get("tags"),
        is_public: row.get("is_public"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        group_id: row.get("group_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Attach course, owner and attachments to listed rows, keeping row order.
fn assemble(
    rows: Vec<PgRow>,
    attachments: Vec<Attachment>,
    owner: OwnerVisibility,
) -> Vec<NoteWithRelations> {
    let mut by_note: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
    for attachment in attachments {
        by_note.entry(attachment.note_id).or_default().push(attachment);
    }

    rows.iter()
        .map(|row| {
            let note = map_row_to_note(row);
            let course_name: Option<String> = row.get("course_name");
            let owner = match owner {
                OwnerVisibility::Shown => Some(OwnerRef {
                    id: note.user_id,
                    full_name: row.get("owner_name"),
                }),
                OwnerVisibility::Hidden => None,
            };
            NoteWithRelations {
                attachments: by_note.remove(&note.id).unwrap_or_default(),
                course: course_name.map(|name| CourseRef { name }),
                owner,
                note,
            }
        })
        .collect()
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let row = sqlx::query(&format!(
            "INSERT INTO notes (id, title, content, tags, is_public, user_id, course_id, group_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(new_id())
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.tags)
        .bind(req.is_public)
        .bind(req.user_id)
        .bind(req.course_id)
        .bind(req.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_note(&row))
    }

    async fn fetch_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM notes WHERE id = $1 AND user_id = $2",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_note))
    }

    async fn fetch_with_relations(&self, id: Uuid) -> Result<Option<NoteWithRelations>> {
        let mut notes = self
            .list_where("n.id = $1", Some(id), OwnerVisibility::Hidden)
            .await?;
        Ok(notes.pop())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<NoteWithRelations>> {
        self.list_where("n.user_id = $1", Some(user_id), OwnerVisibility::Hidden)
            .await
    }

    async fn list_public(&self) -> Result<Vec<NoteWithRelations>> {
        self.list_where("n.is_public", None, OwnerVisibility::Shown)
            .await
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<NoteWithRelations>> {
        self.list_where("n.group_id = $1", Some(group_id), OwnerVisibility::Shown)
            .await
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let row = sqlx::query(&format!(
            "UPDATE notes SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                tags = COALESCE($4, tags),
                is_public = COALESCE($5, is_public),
                course_id = CASE WHEN $6 THEN $7 ELSE course_id END,
                group_id = CASE WHEN $8 THEN $9 ELSE group_id END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.tags)
        .bind(req.is_public)
        .bind(req.course_id.is_some())
        .bind(req.course_id.flatten())
        .bind(req.group_id.is_some())
        .bind(req.group_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(map_row_to_note)
            .ok_or_else(|| Error::NotFound("Note not found".to_string()))
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Vec<Attachment>>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owned: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM notes WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if owned.is_none() {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(None);
        }

        let removed = remove_for_note(&mut *tx, id).await?;
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(Some(removed))
    }
}
