//! # notehub-db
//!
//! PostgreSQL database layer for NoteHub.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, courses, notes, attachments and
//!   study groups
//! - Filesystem storage for attachment uploads
//!
//! ## Example
//!
//! ```rust,ignore
//! use notehub_db::{Database, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notehub").await?;
//!     for note in db.notes.list_public().await? {
//!         println!("{}", note.note.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod courses;
pub mod file_storage;
pub mod groups;
pub mod notes;
pub mod pool;
pub mod users;

// Test fixtures for integration tests (tests/ directory).
pub mod test_fixtures;

// Re-export core types
pub use notehub_core::*;

pub use attachments::PgAttachmentRepository;
pub use courses::PgCourseRepository;
pub use file_storage::{
    generate_upload_name, name_from_url, upload_url, FilesystemBackend, StorageBackend,
    StoredUpload, UploadStore,
};
pub use groups::PgGroupRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_lazy_pool, create_pool, create_pool_with_config, PoolConfig};
pub use users::PgUserRepository;

/// Map a unique-constraint violation to `Error::Conflict(message)`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> Error {
    let is_unique = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);
    if is_unique {
        Error::Conflict(message.to_string())
    } else {
        Error::Database(err)
    }
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub users: PgUserRepository,
    pub courses: PgCourseRepository,
    pub notes: PgNoteRepository,
    pub attachments: PgAttachmentRepository,
    pub groups: PgGroupRepository,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl Database {
    /// Create a new Database instance from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            courses: PgCourseRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            attachments: PgAttachmentRepository::new(pool.clone()),
            groups: PgGroupRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Round-trip a trivial query to check connectivity.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
