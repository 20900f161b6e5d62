//! Test fixtures for database integration tests.
//!
//! ## Configuration
//!
//! The test database URL comes from the `DATABASE_URL` environment variable.
//! When it is unset, database tests print a skip message and return early.
//!
//! ```rust,ignore
//! use notehub_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let Some(test_db) = TestDatabase::connect().await else { return };
//!     let user = test_db.create_user("ana").await;
//! }
//! ```

use std::time::Duration;

use uuid::Uuid;

use crate::{Database, NewUser, PoolConfig, User, UserRepository};

/// Password hash placeholder for fixture users that never log in.
pub const FIXTURE_PASSWORD_HASH: &str = "$argon2id$v=19$m=1024,t=1,p=1$Zml4dHVyZQ$Zml4dHVyZQ";

/// Migrated database handle for integration tests.
pub struct TestDatabase {
    pub db: Database,
}

impl TestDatabase {
    /// Connect to `DATABASE_URL` and apply migrations, or `None` to skip.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping: DATABASE_URL not set");
            return None;
        };

        let config = PoolConfig::new()
            .max_connections(5)
            .connect_timeout(Duration::from_secs(5));
        let db = match Database::connect_with_config(&url, config).await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("Skipping: cannot connect to {}: {}", url, e);
                return None;
            }
        };

        #[cfg(feature = "migrations")]
        if let Err(e) = db.migrate().await {
            eprintln!("Skipping: migrations failed: {}", e);
            return None;
        }

        Some(Self { db })
    }

    /// Insert a user with a unique email derived from `prefix`.
    pub async fn create_user(&self, prefix: &str) -> User {
        self.db
            .users
            .insert(NewUser {
                email: unique_email(prefix),
                password_hash: FIXTURE_PASSWORD_HASH.to_string(),
                full_name: format!("{} Tester", prefix),
            })
            .await
            .expect("fixture user insert")
    }
}

/// A fresh email address so tests never collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@inst.edu", prefix, Uuid::new_v4().simple())
}
