//! Tag codec: a list of tags is stored as one comma-joined column.
//!
//! The encoding does not escape the delimiter, so a tag containing `,`
//! comes back as several tags.

pub const TAG_DELIMITER: &str = ",";

/// Trim every tag, drop the empty ones and join the rest.
///
/// Returns `None` (never an empty string) when nothing survives.
pub fn encode_tags(tags: Option<&[String]>) -> Option<String> {
    let kept: Vec<&str> = tags?
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(TAG_DELIMITER))
}

/// Split a stored tag column back into tags, in stored order.
pub fn decode_tags(stored: Option<&str>) -> Option<Vec<String>> {
    let stored = stored?;
    let tags: Vec<String> = stored
        .split(TAG_DELIMITER)
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() { None } else { Some(tags) }
}

/// The form a tag list takes after a trip through storage.
pub fn normalize_tags(tags: Option<&[String]>) -> Option<Vec<String>> {
    decode_tags(encode_tags(tags).as_deref())
}
