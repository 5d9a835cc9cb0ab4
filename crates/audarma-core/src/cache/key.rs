use serde::{Deserialize, Serialize};

use crate::config::Lang;
use crate::item::{ContentKey, TranslationItem};

/// Storage key for one cached translation: `(content_type, content_id, locale)`.
///
/// At most one live entry exists per key; writes replace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content: ContentKey,
    pub locale: Lang,
}

impl CacheKey {
    pub fn new(content: ContentKey, locale: Lang) -> Self {
        Self { content, locale }
    }

    pub fn for_item(item: &TranslationItem, locale: &Lang) -> Self {
        Self::new(item.key(), locale.clone())
    }

    /// Byte encoding for ordered key-value stores.
    ///
    /// Null separators keep ("a", "bc") and ("ab", "c") apart.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}\0{}\0{}",
            self.content.content_type,
            self.content.content_id,
            self.locale.as_str()
        )
        .into_bytes()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.content, self.locale)
    }
}

/// Fingerprint of source text at translation time (32 hex chars).
pub fn source_hash(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

/// One durably stored translation, in the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTranslation {
    pub content_type: String,
    pub content_id: String,
    pub locale: Lang,
    pub original_text: String,
    pub translated_text: String,
    pub source_hash: String,
    /// Last write, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl StoredTranslation {
    /// Build the entry for a fresh translation of `item`, stamped now.
    pub fn new(item: &TranslationItem, locale: &Lang, translated_text: impl Into<String>) -> Self {
        Self {
            content_type: item.content_type.clone(),
            content_id: item.content_id.clone(),
            locale: locale.clone(),
            original_text: item.text.clone(),
            translated_text: translated_text.into(),
            source_hash: source_hash(&item.text),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(
            ContentKey::new(&self.content_type, &self.content_id),
            self.locale.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(content_type: &str, id: &str, locale: &str) -> CacheKey {
        CacheKey::new(ContentKey::new(content_type, id), Lang::new(locale))
    }

    #[test]
    fn test_source_hash_is_fixed_length_hex() {
        let h = source_hash("Hello world");
        assert_eq!(h.len(), 32);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, source_hash("Hello world"));
        assert_ne!(h, source_hash("Hello world!"));
    }

    #[test]
    fn test_key_bytes_differ_by_locale() {
        assert_ne!(key("ui", "x", "fr").to_bytes(), key("ui", "x", "de").to_bytes());
    }

    #[test]
    fn test_key_bytes_separator_prevents_collision() {
        assert_ne!(key("a", "bc", "fr").to_bytes(), key("ab", "c", "fr").to_bytes());
    }

    #[test]
    fn test_stored_translation_layout() {
        let item = TranslationItem::new("ui", "x", "Hello");
        let entry = StoredTranslation::new(&item, &Lang::new("fr"), "Bonjour");
        assert_eq!(entry.key(), key("ui", "x", "fr"));
        assert_eq!(entry.source_hash, source_hash("Hello"));

        let json = serde_json::to_value(&entry).unwrap();
        for field in [
            "content_type",
            "content_id",
            "locale",
            "original_text",
            "translated_text",
            "source_hash",
            "timestamp",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
