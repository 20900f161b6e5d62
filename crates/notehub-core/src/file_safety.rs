//! Upload validation for note attachments.
//!
//! Only a fixed set of image formats and PDF are accepted. The declared MIME
//! type is checked against the allow-list, and the payload's magic bytes must
//! identify an allowed type as well. A payload nothing recognizes is rejected,
//! so an executable or an HTML page labelled `image/png` never gets stored.
//!
//! The stored file's extension comes from the detected type alone. The
//! client filename is kept only as display text.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::FileKind;

/// MIME types accepted as attachments.
pub static ALLOWED_MIME_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "application/pdf",
    ]
    .into_iter()
    .collect()
});

/// Message returned for a disallowed file type.
pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Only images and PDFs are allowed.";

/// Outcome of a successful upload check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedUpload {
    /// MIME type detected from the payload.
    pub mime: String,
    pub kind: FileKind,
    /// Lowercase extension including the dot, e.g. `.png`.
    pub extension: String,
}

/// True when the MIME type is on the attachment allow-list.
pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(normalize_mime(mime).as_str())
}

fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or(mime)
        .trim()
        .to_ascii_lowercase()
}

/// Human readable form of a byte ceiling, e.g. `10MB`.
pub fn format_limit(max_bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{}MB", max_bytes / MIB)
    } else {
        format!("{} bytes", max_bytes)
    }
}

/// Message returned for an oversized file.
pub fn too_large_message(max_bytes: usize) -> String {
    format!("File too large. Maximum size is {}", format_limit(max_bytes))
}

/// Validate an uploaded file before anything is stored.
pub fn validate_upload(
    declared_mime: &str,
    data: &[u8],
    max_bytes: usize,
) -> Result<CheckedUpload> {
    if data.len() > max_bytes {
        return Err(Error::InvalidInput(too_large_message(max_bytes)));
    }

    let declared = normalize_mime(declared_mime);
    if !ALLOWED_MIME_TYPES.contains(declared.as_str()) {
        return Err(Error::InvalidInput(INVALID_TYPE_MESSAGE.to_string()));
    }

    let mime = infer::get(data)
        .map(|kind| kind.mime_type())
        .filter(|detected| ALLOWED_MIME_TYPES.contains(detected))
        .ok_or_else(|| Error::InvalidInput(INVALID_TYPE_MESSAGE.to_string()))?;

    let extension = extension_for(mime)
        .ok_or_else(|| Error::InvalidInput(INVALID_TYPE_MESSAGE.to_string()))?;
    Ok(CheckedUpload {
        kind: FileKind::from_mime(mime),
        mime: mime.to_string(),
        extension: extension.to_string(),
    })
}

/// Extension for a stored file of an allowed MIME type.
pub fn extension_for(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/gif" => Some(".gif"),
        "image/webp" => Some(".webp"),
        "application/pdf" => Some(".pdf"),
        _ => None,
    }
}

/// Strip path components and control characters from a client filename.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
