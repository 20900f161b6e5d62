//! User repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use notehub_core::{new_id, normalize_email, Error, NewUser, Result, User, UserRepository};

use crate::map_unique_violation;

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_row_to_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, full_name, created_at",
        )
        .bind(new_id())
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.full_name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already in use"))?;

        Ok(map_row_to_user(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, full_name, created_at
             FROM users WHERE LOWER(email) = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, full_name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, email, password_hash, full_name, created_at
             FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_user).collect())
    }
}
