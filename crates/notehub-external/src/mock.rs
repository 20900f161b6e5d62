//! In-memory metadata provider for tests and offline development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use notehub_core::video::watch_url;
use notehub_core::{Error, Result, VideoMetadata, VideoMetadataProvider};

use crate::youtube::{NOT_FOUND_MESSAGE, UPSTREAM_MESSAGE};

/// Serves canned metadata; unknown ids are "not found".
#[derive(Debug, Default)]
pub struct MockVideoProvider {
    videos: RwLock<HashMap<String, VideoMetadata>>,
    upstream_down: bool,
    calls: AtomicUsize,
}

impl MockVideoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call fails as an upstream outage.
    pub fn failing() -> Self {
        Self {
            upstream_down: true,
            ..Self::default()
        }
    }

    /// Register a video with generated metadata.
    pub fn with_video(self, video_id: &str, title: &str) -> Self {
        let meta = VideoMetadata {
            video_id: video_id.to_string(),
            title: title.to_string(),
            author: "Mock Channel".to_string(),
            author_url: "https://www.youtube.com/@mock".to_string(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id),
            url: watch_url(video_id),
        };
        if let Ok(mut videos) = self.videos.write() {
            videos.insert(video_id.to_string(), meta);
        }
        self
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoMetadataProvider for MockVideoProvider {
    async fn fetch_by_id(&self, video_id: &str) -> Result<VideoMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.upstream_down {
            return Err(Error::Upstream(UPSTREAM_MESSAGE.to_string()));
        }
        let videos = self
            .videos
            .read()
            .map_err(|_| Error::Internal("mock provider lock poisoned".to_string()))?;
        videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_ids() {
        let provider = MockVideoProvider::new().with_video("abc", "Lecture 1");
        let meta = provider.fetch_by_id("abc").await.unwrap();
        assert_eq!(meta.title, "Lecture 1");
        assert_eq!(meta.url, "https://www.youtube.com/watch?v=abc");

        assert!(matches!(
            provider.fetch_by_id("zzz").await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockVideoProvider::failing().with_video("abc", "x");
        assert!(matches!(
            provider.fetch_by_id("abc").await,
            Err(Error::Upstream(_))
        ));
    }
}
