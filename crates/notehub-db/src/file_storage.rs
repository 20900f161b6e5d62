//! Upload storage for note attachments.
//!
//! Files are written under a flat upload directory with a generated name
//! (`<unix-millis>-<9 random digits><ext>`) and served back at
//! `/uploads/<name>`. The database only stores the public URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use notehub_core::defaults::UPLOADS_URL_PREFIX;
use notehub_core::{Error, Result};

/// Storage backend trait for file operations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data under the given relative path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Delete data at the given relative path. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<()>;}

/// Filesystem storage backend rooted at a base directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        if !is_plain_name(path) {
            return Err(Error::InvalidInput(format!("Invalid storage path: {}", path)));
        }
        Ok(self.base_path.join(path))
    }

    /// Create the base directory and check it is writable.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", self.base_path, e))?;

        let probe = self.base_path.join(".health-check");
        fs::write(&probe, b"ok")
            .await
            .map_err(|e| format!("write({:?}): {}", probe, e))?;
        let _ = fs::remove_file(&probe).await;
        Ok(())
    }
}

/// A single path segment with no traversal.
fn is_plain_name(path: &str) -> bool {
    !path.is_empty()
        && path != "."
        && path != ".."
        && !path.contains(['/', '\\', '\0'])
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(
            subsystem = "storage",
            component = "uploads",
            op = "write",
            storage_path = %path,
            file_size = data.len(),
            "Writing upload"
        );

        fs::create_dir_all(&self.base_path).await?;

        // Write to a temp file then rename, so readers never see a partial file.
        let temp_path = self.base_path.join(format!(".{}.tmp", path));
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "upload temp file create failed");
            e
        })?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &full_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }}

/// Generate a stored file name: `<unix-millis>-<9 random digits><ext>`.
pub fn generate_upload_name(extension: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{:09}{}", Utc::now().timestamp_millis(), suffix, extension)
}

/// Public URL for a stored file name.
pub fn upload_url(name: &str) -> String {
    format!("{}/{}", UPLOADS_URL_PREFIX, name)
}

/// Stored file name from a public URL, if it points into the upload area.
pub fn name_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOADS_URL_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| is_plain_name(name))
}

/// A file stored for an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub name: String,
    pub url: String,
}

/// Attachment file store used by the note service.
#[derive(Clone)]
pub struct UploadStore {
    backend: Arc<dyn StorageBackend>,
}

impl UploadStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Store bytes under a fresh generated name.
    pub async fn save(&self, data: &[u8], extension: &str) -> Result<StoredUpload> {
        let name = generate_upload_name(extension);
        self.backend.write(&name, data).await?;
        Ok(StoredUpload {
            url: upload_url(&name),
            name,
        })
    }

    /// Remove the file behind a public URL.
    ///
    /// Missing files and foreign URLs are tolerated; other failures are logged
    /// and reported as `false`.
    pub async fn remove_url(&self, url: &str) -> bool {
        let Some(name) = name_from_url(url) else {
            warn!(
                subsystem = "storage",
                component = "uploads",
                op = "remove",
                file_url = %url,
                "Attachment URL is outside the upload area, skipping file removal"
            );
            return false;
        };

        match self.backend.delete(name).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    subsystem = "storage",
                    component = "uploads",
                    op = "remove",
                    file_url = %url,
                    error = %e,
                    "Failed to remove upload"
                );
                false
            }
        }
    }}
