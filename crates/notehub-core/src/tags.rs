//! Tag list normalization.
//!
//! Tags arrive either as a JSON-encoded list (`["exam","ch1"]`) or as a
//! comma-separated string (`exam, ch1`). Both forms become an ordered list of
//! trimmed, non-empty strings. Duplicates are kept.

use serde_json::Value as JsonValue;

/// Parse a raw tags field.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(value @ JsonValue::Array(_)) => tags_from_json(&value),
        Ok(JsonValue::String(s)) => split_comma_separated(&s),
        _ => split_comma_separated(trimmed),
    }
}

/// Tags from an already-decoded JSON value (JSON request bodies).
///
/// Arrays keep their string and number items; a string is split on commas.
pub fn tags_from_json(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => normalize_tags(items.iter().filter_map(|item| match item {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })),
        JsonValue::String(s) => parse_tags(s),
        _ => Vec::new(),
    }
}

fn split_comma_separated(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string))
}

/// Trim every tag and drop the empty ones, preserving order.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
