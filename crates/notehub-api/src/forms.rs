//! Note submission parsing.
//!
//! Notes are created and updated either with a JSON body or with a multipart
//! form that may carry one file in the `attachment` field. Both shapes end up
//! as a [`NoteSubmission`]. Text form fields arrive as strings, so the field
//! types here accept string spellings too.

use std::fmt;

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Json,
};
use serde::{de, Deserialize, Deserializer};
use uuid::Uuid;

use notehub_core::defaults::ATTACHMENT_FIELD;
use notehub_core::file_safety::too_large_message;
use notehub_core::{parse_tags, tags_from_json};

use crate::extract::json_rejection;
use crate::{ApiError, AppState};

// =============================================================================
// FLEXIBLE FIELD TYPES
// =============================================================================

/// Boolean that also accepts the strings sent by HTML forms.
///
/// `true` and `"true"` are true; `false` and any other string are false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlexibleBool(pub bool);

impl FlexibleBool {
    pub fn from_form(value: &str) -> Self {
        FlexibleBool(value.trim() == "true")
    }
}

impl<'de> Deserialize<'de> for FlexibleBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BoolVisitor;

        impl<'de> de::Visitor<'de> for BoolVisitor {
            type Value = FlexibleBool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or the string \"true\"/\"false\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FlexibleBool(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FlexibleBool::from_form(v))
            }
        }

        deserializer.deserialize_any(BoolVisitor)
    }
}

/// Tag list given as a JSON array, a JSON-encoded array string, or a
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlexibleTags(pub Vec<String>);

impl<'de> Deserialize<'de> for FlexibleTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(FlexibleTags(tags_from_json(&value)))
    }
}

/// Parse an optional reference id from a form value. Empty means "none".
pub fn parse_optional_id(field: &str, value: &str) -> Result<Option<Uuid>, ApiError> {
    let value = value.trim();
    if value.is_empty() || value == "null" {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}", field)))
}

/// Present-but-null and empty strings become `Some(None)` ("clear it"); an
/// absent field stays `None` via `#[serde(default)]`.
fn deserialize_nullable_id<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Some(None)),
        Some(s) => Uuid::parse_str(s)
            .map(|id| Some(Some(id)))
            .map_err(|_| de::Error::custom(format!("invalid id: {}", s))),
    }
}

// =============================================================================
// NOTE SUBMISSION
// =============================================================================

/// JSON shape of a note create/update body.
#[derive(Debug, Default, Deserialize)]
pub struct NoteFields {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<FlexibleTags>,
    #[serde(default)]
    pub is_public: Option<FlexibleBool>,
    #[serde(default, deserialize_with = "deserialize_nullable_id")]
    pub course_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable_id")]
    pub group_id: Option<Option<Uuid>>,
}

/// A file received in the `attachment` field, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Parsed note create/update request. Absent fields are `None`.
#[derive(Debug, Default)]
pub struct NoteSubmission {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub course_id: Option<Option<Uuid>>,
    pub group_id: Option<Option<Uuid>>,
    pub attachment: Option<UploadedFile>,
}

impl From<NoteFields> for NoteSubmission {
    fn from(fields: NoteFields) -> Self {
        Self {
            title: fields.title,
            content: fields.content,
            tags: fields.tags.map(|t| t.0),
            is_public: fields.is_public.map(|b| b.0),
            course_id: fields.course_id,
            group_id: fields.group_id,
            attachment: None,
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Map a multipart read failure. Exceeding the body limit is reported with
/// the same message as an oversized file.
fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(too_large_message(max_upload_bytes))
    } else {
        ApiError::BadRequest(format!("Failed to read upload: {}", err.body_text()))
    }
}

impl NoteSubmission {
    async fn from_multipart(
        mut multipart: Multipart,
        max_upload_bytes: usize,
    ) -> Result<Self, ApiError> {
        let mut submission = NoteSubmission::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_upload_bytes))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == ATTACHMENT_FIELD {
                if submission.attachment.is_some() {
                    return Err(ApiError::BadRequest(
                        "Only one attachment per request is allowed".to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_bytes))?;
                submission.attachment = Some(UploadedFile {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, max_upload_bytes))?;
            match name.as_str() {
                "title" => submission.title = Some(value),
                "content" => submission.content = Some(value),
                "tags" => submission.tags = Some(parse_tags(&value)),
                "is_public" => submission.is_public = Some(FlexibleBool::from_form(&value).0),
                "course_id" => submission.course_id = Some(parse_optional_id("course_id", &value)?),
                "group_id" => submission.group_id = Some(parse_optional_id("group_id", &value)?),
                // Unknown text fields are ignored, as browsers may add extras.
                _ => {}
            }
        }

        Ok(submission)
    }
}

#[async_trait]
impl FromRequest<AppState> for NoteSubmission {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let max_upload_bytes = state.config.max_upload_bytes;

        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return NoteSubmission::from_multipart(multipart, max_upload_bytes).await;
        }

        let Json(fields) = Json::<NoteFields>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(fields.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_bool_accepts_strings() {
        let parse = |s: &str| serde_json::from_str::<FlexibleBool>(s).unwrap().0;
        assert!(parse("true"));
        assert!(parse("\"true\""));
        assert!(!parse("false"));
        assert!(!parse("\"false\""));
        assert!(!parse("\"yes\""));
        assert!(serde_json::from_str::<FlexibleBool>("1").is_err());
    }

    #[test]
    fn test_note_fields_tag_shapes() {
        let from_array: NoteFields =
            serde_json::from_str(r#"{"tags": ["exam", " java "]}"#).unwrap();
        assert_eq!(from_array.tags.unwrap().0, vec!["exam", "java"]);

        let from_encoded: NoteFields =
            serde_json::from_str(r#"{"tags": "[\"a\",\"b\"]"}"#).unwrap();
        assert_eq!(from_encoded.tags.unwrap().0, vec!["a", "b"]);

        let from_csv: NoteFields = serde_json::from_str(r#"{"tags": "a, b,,c"}"#).unwrap();
        assert_eq!(from_csv.tags.unwrap().0, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nullable_ids() {
        let id = Uuid::now_v7();
        let absent: NoteFields = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.group_id, None);

        let cleared: NoteFields = serde_json::from_str(r#"{"group_id": null}"#).unwrap();
        assert_eq!(cleared.group_id, Some(None));

        let empty: NoteFields = serde_json::from_str(r#"{"course_id": ""}"#).unwrap();
        assert_eq!(empty.course_id, Some(None));

        let set: NoteFields =
            serde_json::from_str(&format!(r#"{{"course_id": "{}"}}"#, id)).unwrap();
        assert_eq!(set.course_id, Some(Some(id)));

        assert!(serde_json::from_str::<NoteFields>(r#"{"course_id": "nope"}"#).is_err());
    }

    #[test]
    fn test_parse_optional_id_from_form() {
        assert_eq!(parse_optional_id("course_id", "").unwrap(), None);
        assert_eq!(parse_optional_id("course_id", "null").unwrap(), None);
        assert!(parse_optional_id("course_id", "abc").is_err());
    }

    #[test]
    fn test_submission_from_fields() {
        let fields: NoteFields =
            serde_json::from_str(r#"{"title": "T1", "is_public": "true"}"#).unwrap();
        let submission = NoteSubmission::from(fields);
        assert_eq!(submission.title.as_deref(), Some("T1"));
        assert_eq!(submission.is_public, Some(true));
        assert!(submission.attachment.is_none());
    }
}
