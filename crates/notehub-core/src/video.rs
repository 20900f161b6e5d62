//! Video URL recognition and the inline video reference marker.
//!
//! A note may embed any number of `[YOUTUBE:{...}]` markers whose payload is
//! a serialized [`VideoMetadata`]. The server stores them as plain text;
//! clients extract them to render cards and strip them before rendering
//! markdown.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::defaults::YOUTUBE_WATCH_URL;
use crate::error::{Error, Result};
use crate::models::VideoMetadata;

/// Recognized video URL shapes: watch, embed, shorts and short links.
static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/(watch\?v=|embed/|shorts/)|youtu\.be/)[\w-]+")
        .expect("video URL pattern is valid")
});

/// Marker with its JSON payload captured.
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[YOUTUBE:(\{.*?\})\]").expect("marker pattern is valid"));

/// Marker plus an optional trailing newline, for stripping.
static MARKER_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[YOUTUBE:\{.*?\}\]\n?").expect("marker pattern is valid"));

/// True when the URL looks like a supported video link.
pub fn is_video_url(url: &str) -> bool {
    VIDEO_URL_RE.is_match(url.trim())
}

/// Extract the video id from a supported URL.
///
/// Fails with `InvalidInput` when the URL is not recognized or carries no id.
pub fn extract_video_id(url: &str) -> Result<String> {
    let url = url.trim();
    if !is_video_url(url) {
        return Err(Error::InvalidInput("Invalid YouTube URL format".to_string()));
    }

    let absolute = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    let parsed = Url::parse(&absolute)
        .map_err(|_| Error::InvalidInput("Invalid YouTube URL format".to_string()))?;

    let host = parsed.host_str().unwrap_or_default();
    let path = parsed.path();

    let raw = if host.contains("youtu.be") {
        path.strip_prefix('/').map(str::to_string)
    } else if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        Some(v.into_owned())
    } else if let Some((_, rest)) = path.split_once("/embed/") {
        Some(rest.to_string())
    } else {
        path.split_once("/shorts/").map(|(_, rest)| rest.to_string())
    };

    let id = raw
        .as_deref()
        .and_then(|id| id.split(['/', '?', '&', '#']).next())
        .unwrap_or_default()
        .to_string();

    let well_formed = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if id.is_empty() || !well_formed {
        return Err(Error::InvalidInput(
            "Could not extract video ID from URL".to_string(),
        ));
    }
    Ok(id)
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", YOUTUBE_WATCH_URL, video_id)
}

/// Serialize metadata into an inline marker.
pub fn to_marker(meta: &VideoMetadata) -> Result<String> {
    Ok(format!("[YOUTUBE:{}]", serde_json::to_string(meta)?))
}

/// Every well-formed marker payload in `content`, in order.
///
/// Markers whose payload does not decode are skipped.
pub fn extract_markers(content: &str) -> Vec<VideoMetadata> {
    MARKER_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| serde_json::from_str(m.as_str()).ok())
        .collect()
}

/// Content with every marker (and the newline right after it) removed.
pub fn strip_markers(content: &str) -> String {
    MARKER_STRIP_RE.replace_all(content, "").into_owned()
}

/// Append a marker to note content, on its own line.
pub fn append_marker(content: &str, meta: &VideoMetadata) -> Result<String> {
    let marker = to_marker(meta)?;
    if content.is_empty() {
        Ok(format!("{}\n", marker))
    } else if content.ends_with('\n') {
        Ok(format!("{}{}\n", content, marker))
    } else {
        Ok(format!("{}\n{}\n", content, marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str) -> VideoMetadata {
        VideoMetadata {
            video_id: id.to_string(),
            title: "Lecture".to_string(),
            author: "Prof".to_string(),
            author_url: "https://www.youtube.com/@prof".to_string(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
            url: watch_url(id),
        }
    }

    #[test]
    fn test_watch_url_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=abc123&t=42s").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_short_link_id() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=xyz").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_embed_and_shorts_ids() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc-_1").unwrap(),
            "abc-_1"
        );
        assert_eq!(
            extract_video_id("www.youtube.com/shorts/Zx9").unwrap(),
            "Zx9"
        );
    }

    #[test]
    fn test_id_stops_at_path_separator() {
        assert_eq!(extract_video_id("https://youtu.be/abc/def").unwrap(), "abc");
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/Zx9/extra").unwrap(),
            "Zx9"
        );
    }

    #[test]
    fn test_id_with_foreign_characters_rejected() {
        let err = extract_video_id("https://www.youtube.com/watch?v=abc%20def").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_unrecognized_hosts_rejected() {
        for url in [
            "https://vimeo.com/123",
            "https://example.com/watch?v=abc",
            "not a url",
            "",
        ] {
            let err = extract_video_id(url).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{url}");
        }
    }

    #[test]
    fn test_watch_url_format() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_marker_extraction_skips_malformed() {
        let content = format!(
            "# Notes\n{}\ntext [YOUTUBE:{{not json}}]\n{}",
            to_marker(&meta("one")).unwrap(),
            to_marker(&meta("two")).unwrap()
        );
        let found = extract_markers(&content);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].video_id, "one");
        assert_eq!(found[1].video_id, "two");
    }

    #[test]
    fn test_strip_markers_removes_trailing_newline() {
        let content = format!("intro\n{}\noutro", to_marker(&meta("x")).unwrap());
        assert_eq!(strip_markers(&content), "intro\noutro");
        assert_eq!(strip_markers("plain"), "plain");
    }

    #[test]
    fn test_append_marker_on_own_line() {
        let out = append_marker("hello", &meta("v1")).unwrap();
        assert!(out.starts_with("hello\n[YOUTUBE:{"));
        assert!(out.ends_with("}]\n"));
        assert_eq!(extract_markers(&out), vec![meta("v1")]);
        assert_eq!(strip_markers(&out), "hello\n");
    }
}
