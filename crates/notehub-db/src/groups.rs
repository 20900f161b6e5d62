//! Study group repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use notehub_core::{
    new_id, CreateGroupRequest, Error, GroupMember, GroupRepository, MemberInfo, Result,
    StudyGroup,
};

use crate::map_unique_violation;

const GROUP_COLUMNS: &str = "g.id, g.name, g.description, g.admin_user_id, g.created_at";

/// PostgreSQL implementation of GroupRepository.
pub struct PgGroupRepository {
    pool: Pool<Postgres>,
}

impl PgGroupRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_group(row: &PgRow) -> StudyGroup {
    StudyGroup {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        admin_user_id: row.get("admin_user_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, req: CreateGroupRequest) -> Result<StudyGroup> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(
            "INSERT INTO study_groups (id, name, description, admin_user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, description, admin_user_id, created_at",
        )
        .bind(new_id())
        .bind(req.name.trim())
        .bind(req.description.as_deref())
        .bind(req.admin_user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let group = map_row_to_group(&row);

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(group.id)
            .bind(group.admin_user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "groups",
            op = "create",
            group_id = %group.id,
            user_id = %group.admin_user_id,
            "Study group created"
        );
        Ok(group)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StudyGroup>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM study_groups g WHERE g.id = $1",
            GROUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_group))
    }

    async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_admin_of(&self, user_id: Uuid) -> Result<Vec<StudyGroup>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM study_groups g
             WHERE g.admin_user_id = $1
             ORDER BY g.created_at, g.id",
            GROUP_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_group).collect())
    }

    async fn list_member_of(&self, user_id: Uuid) -> Result<Vec<StudyGroup>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM study_groups g
             JOIN group_members m ON m.group_id = g.id
             WHERE m.user_id = $1 AND g.admin_user_id <> $1
             ORDER BY m.joined_at, g.id",
            GROUP_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_group).collect())
    }

    async fn members(&self, group_id: Uuid) -> Result<Vec<MemberInfo>> {
        let rows = sqlx::query(
            "SELECT u.id, u.email, u.full_name, m.joined_at
             FROM group_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.group_id = $1
             ORDER BY m.joined_at, u.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| MemberInfo {
                id: row.get("id"),
                email: row.get("email"),
                full_name: row.get("full_name"),
                joined_at: row.get("joined_at"),
            })
            .collect())
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupMember> {
        let row = sqlx::query(
            "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)
             RETURNING group_id, user_id, joined_at",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User is already a member of this group"))?;

        Ok(GroupMember {
            group_id: row.get("group_id"),
            user_id: row.get("user_id"),
            joined_at: row.get("joined_at"),
        })
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
