//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Get the user's cache directory following XDG conventions.
///
/// Returns `$XDG_CACHE_HOME` if set, otherwise `$HOME/.cache`.
pub fn cache_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
}

/// Root directory for everything audarma persists locally.
pub fn data_dir() -> PathBuf {
    cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("audarma")
}

/// Default location of the sled translation cache.
pub fn translation_db_path() -> PathBuf {
    data_dir().join("translations")
}

/// Default location of the single-document JSON translation cache.
pub fn translation_file_path() -> PathBuf {
    data_dir().join("translations.json")
}

/// Default location of the usage counters.
pub fn stats_db_path() -> PathBuf {
    data_dir().join("stats")
}

/// Shorten text for log lines, respecting char boundaries.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Hello", 10), "Hello");
        assert_eq!(truncate_text("Hello world", 5), "Hello...");
        assert_eq!(truncate_text("Қазақша", 3), "Қаз...");
    }

    #[test]
    fn test_default_paths_share_root() {
        let root = data_dir();
        assert!(translation_db_path().starts_with(&root));
        assert!(translation_file_path().starts_with(&root));
        assert!(stats_db_path().starts_with(&root));
    }
}
