//! Course repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::info;

use notehub_core::{new_id, Course, CourseRepository, CreateCourseRequest, Error, Result};

/// PostgreSQL implementation of CourseRepository.
pub struct PgCourseRepository {
    pool: Pool<Postgres>,
}

impl PgCourseRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_course(row: &PgRow) -> Course {
    Course {
        id: row.get("id"),
        name: row.get("name"),
        semester: row.get("semester"),
        teacher_name: row.get("teacher_name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CourseRepository for PgCourseRepository {
    async fn list(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, name, semester, teacher_name, created_at
             FROM courses ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_course).collect())
    }

    async fn insert(&self, req: CreateCourseRequest) -> Result<Course> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Course name is required".to_string()));
        }

        let row = sqlx::query(
            "INSERT INTO courses (id, name, semester, teacher_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, semester, teacher_name, created_at",
        )
        .bind(new_id())
        .bind(name)
        .bind(req.semester)
        .bind(
            req.teacher_name
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty()),
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_course(&row))
    }

    async fn find_or_create_by_name(&self, name: &str) -> Result<(Course, bool)> {
        let existing = sqlx::query(
            "SELECT id, name, semester, teacher_name, created_at
             FROM courses WHERE name = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(row) = existing {
            return Ok((map_row_to_course(&row), false));
        }

        let course = self
            .insert(CreateCourseRequest {
                name: name.to_string(),
                ..Default::default()
            })
            .await?;
        info!(
            subsystem = "db",
            component = "courses",
            op = "seed",
            course_id = %course.id,
            name = %course.name,
            "Course created"
        );
        Ok((course, true))
    }
}
