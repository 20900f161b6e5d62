//! oEmbed-backed video metadata client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use notehub_core::defaults::{EXTERNAL_TIMEOUT_SECS, YOUTUBE_OEMBED_URL};
use notehub_core::video::watch_url;
use notehub_core::{Error, Result, VideoMetadata, VideoMetadataProvider};

/// Message for unknown or private videos.
pub const NOT_FOUND_MESSAGE: &str = "Video not found or is private";

/// Message for any other upstream failure.
pub const UPSTREAM_MESSAGE: &str = "Failed to fetch YouTube metadata";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    author_url: String,
    #[serde(default)]
    thumbnail_url: String,
}

/// Fetches video metadata from a public oEmbed endpoint. No API key needed.
#[derive(Debug, Clone)]
pub struct YoutubeOEmbedClient {
    client: Client,
    endpoint: String,
}

impl YoutubeOEmbedClient {
    /// Client against the public endpoint with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_config(
            YOUTUBE_OEMBED_URL,
            Duration::from_secs(EXTERNAL_TIMEOUT_SECS),
        )
    }

    pub fn with_config(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, video_id: &str) -> String {
        format!(
            "{}?url={}&format=json",
            self.endpoint,
            urlencoding::encode(&watch_url(video_id))
        )
    }
}

/// Upstream status to domain error.
pub fn map_status(status: StatusCode) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            Error::NotFound(NOT_FOUND_MESSAGE.to_string())
        }
        _ => Error::Upstream(UPSTREAM_MESSAGE.to_string()),
    }
}

#[async_trait]
impl VideoMetadataProvider for YoutubeOEmbedClient {
    async fn fetch_by_id(&self, video_id: &str) -> Result<VideoMetadata> {
        let start = Instant::now();

        let response = self
            .client
            .get(self.request_url(video_id))
            .send()
            .await
            .map_err(|e| {
                warn!(
                    subsystem = "external",
                    component = "youtube",
                    op = "fetch",
                    video_id = %video_id,
                    error = %e,
                    "oEmbed request failed"
                );
                Error::Upstream(UPSTREAM_MESSAGE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                subsystem = "external",
                component = "youtube",
                op = "fetch",
                video_id = %video_id,
                status = status.as_u16(),
                "oEmbed returned an error status"
            );
            return Err(map_status(status));
        }

        let body: OEmbedResponse = response.json().await.map_err(|e| {
            warn!(
                subsystem = "external",
                component = "youtube",
                op = "fetch",
                video_id = %video_id,
                error = %e,
                "oEmbed response did not parse"
            );
            Error::Upstream(UPSTREAM_MESSAGE.to_string())
        })?;

        debug!(
            subsystem = "external",
            component = "youtube",
            op = "fetch",
            video_id = %video_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched video metadata"
        );

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: body.title,
            author: body.author_name,
            author_url: body.author_url,
            thumbnail_url: body.thumbnail_url,
            url: watch_url(video_id),
        })
    }
}
