//! Shared application state.

use std::sync::Arc;

use notehub_core::VideoMetadataProvider;
use notehub_crypto::{PasswordHasher, TokenSigner};
use notehub_db::{Database, UploadStore};

use crate::config::ServerConfig;

/// State handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenSigner>,
    pub passwords: PasswordHasher,
    pub uploads: UploadStore,
    pub video: Arc<dyn VideoMetadataProvider>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        db: Database,
        tokens: TokenSigner,
        passwords: PasswordHasher,
        uploads: UploadStore,
        video: Arc<dyn VideoMetadataProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
            passwords,
            uploads,
            video,
            config: Arc::new(config),
        }
    }
}
