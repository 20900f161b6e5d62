//! The logged-in session and its on-disk copy.
//!
//! A [`Session`] is passed explicitly to every authenticated API call. A
//! [`SessionFile`] keeps it between runs so a restarted client stays logged
//! in until the token expires.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use notehub_core::UserSummary;

use crate::error::Result;

/// Bearer token plus the user it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserSummary) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// JSON file holding the last session.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing or unreadable file means "logged out".
    pub async fn load(&self) -> Result<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(
                    subsystem = "client",
                    component = "session",
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring corrupt session file"
                );
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec(session)?).await?;
        debug!(
            subsystem = "client",
            component = "session",
            user_id = %session.user_id(),
            "Session saved"
        );
        Ok(())
    }

    /// Delete the stored session. Clearing an absent file succeeds.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
