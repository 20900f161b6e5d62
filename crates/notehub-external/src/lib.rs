//! # notehub-external
//!
//! Lookup of external video metadata for inline video references.
//!
//! [`fetch_video_metadata`] validates and parses a video URL, then asks a
//! [`VideoMetadataProvider`] for the normalized metadata. The production
//! provider is [`YoutubeOEmbedClient`]; [`MockVideoProvider`] serves canned
//! data for tests.

pub mod mock;
pub mod youtube;

pub use mock::MockVideoProvider;
pub use youtube::{map_status, YoutubeOEmbedClient, NOT_FOUND_MESSAGE, UPSTREAM_MESSAGE};

use notehub_core::video::extract_video_id;
use notehub_core::{Error, Result, VideoMetadata, VideoMetadataProvider};

/// Resolve a video URL to normalized metadata.
///
/// A blank URL or one that is not a recognized video link is `InvalidInput`;
/// provider errors pass through unchanged.
pub async fn fetch_video_metadata(
    provider: &dyn VideoMetadataProvider,
    url: &str,
) -> Result<VideoMetadata> {
    if url.trim().is_empty() {
        return Err(Error::InvalidInput("YouTube URL is required".to_string()));
    }
    let video_id = extract_video_id(url)?;
    provider.fetch_by_id(&video_id).await
}
