use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use notehub_api::{build_router, set_expose_internal_errors, AppState, ServerConfig};
use notehub_crypto::{HashParams, PasswordHasher, TokenSigner};
use notehub_db::{Database, FilesystemBackend, PoolConfig, UploadStore};
use notehub_external::YoutubeOEmbedClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _log_guard = notehub_api::telemetry::init_tracing("notehub_api=debug,tower_http=debug");

    let config = ServerConfig::from_env()?;
    set_expose_internal_errors(config.is_development());

    // Database
    let db = Database::connect_with_config(&config.database_url, PoolConfig::new()).await?;
    db.migrate().await?;
    info!(subsystem = "db", "Migrations applied");

    // Upload storage
    let backend = FilesystemBackend::new(&config.upload_dir);
    backend
        .validate()
        .await
        .map_err(|e| anyhow::anyhow!("Upload directory unusable: {}", e))?;
    let uploads = UploadStore::new(backend);

    let tokens = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_ttl())?;
    let video = YoutubeOEmbedClient::with_config(
        config.youtube_oembed_url.clone(),
        config.external_timeout,
    )?;

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(
        db,
        tokens,
        PasswordHasher::new(HashParams::default()),
        uploads,
        Arc::new(video),
        config,
    );
    let app = build_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
