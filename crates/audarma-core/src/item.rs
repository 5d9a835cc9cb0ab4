//! Translatable content units and their identity.

use serde::{Deserialize, Serialize};

/// A unit of translatable content, e.g. a UI label or a story headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationItem {
    /// Namespace tag such as `ui` or `story_title`
    pub content_type: String,
    /// Identifier unique within `content_type`
    pub content_id: String,
    /// Source-language text
    pub text: String,
}

impl TranslationItem {
    pub fn new(
        content_type: impl Into<String>,
        content_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            content_id: content_id.into(),
            text: text.into(),
        }
    }

    pub fn key(&self) -> ContentKey {
        ContentKey::new(&self.content_type, &self.content_id)
    }
}

/// `(content_type, content_id)`: what a translation belongs to, independent of locale.
///
/// Displays as `content_type:content_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKey {
    pub content_type: String,
    pub content_id: String,
}

impl ContentKey {
    pub fn new(content_type: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content_id: content_id.into(),
        }
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.content_type, self.content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_wire_format_is_camel_case() {
        let item: TranslationItem =
            serde_json::from_str(r#"{"contentType":"ui","contentId":"x","text":"Hello"}"#).unwrap();
        assert_eq!(item, TranslationItem::new("ui", "x", "Hello"));
    }

    #[test]
    fn test_content_key_display() {
        assert_eq!(ContentKey::new("ui", "header_title").to_string(), "ui:header_title");
    }
}
