//! Course catalogue.

use tracing::info;

use notehub_core::defaults::DEFAULT_COURSES;
use notehub_core::{Course, CourseRepository, CreateCourseRequest, Error, Result};
use notehub_db::Database;

#[derive(Clone)]
pub struct CourseService {
    db: Database,
}

impl CourseService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Course>> {
        self.db.courses.list().await
    }

    /// Any authenticated user may add a course.
    pub async fn create(&self, req: CreateCourseRequest) -> Result<Course> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Course name is required".to_string()));
        }
        let course = self
            .db
            .courses
            .insert(CreateCourseRequest {
                name,
                semester: req.semester,
                teacher_name: req
                    .teacher_name
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            })
            .await?;
        info!(
            subsystem = "api",
            component = "courses",
            op = "create",
            course_id = %course.id,
            "Course created"
        );
        Ok(course)
    }

    /// Insert the default course list, skipping names that already exist.
    /// Returns how many were created.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut created = 0;
        for name in DEFAULT_COURSES {
            let (_, was_created) = self.db.courses.find_or_create_by_name(name).await?;
            if was_created {
                created += 1;
            }
        }
        Ok(created)
    }
}
