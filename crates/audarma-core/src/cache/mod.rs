mod disk;
mod file;
mod key;
mod memory;
mod store;

pub use disk::DiskStore;
pub use file::JsonFileStore;
pub use key::{CacheKey, StoredTranslation, source_hash};
pub use memory::MemoryStore;
pub use store::TranslationStore;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{CacheBackend, CacheConfig, Lang};
use crate::error::Result;
use crate::item::{ContentKey, TranslationItem};

/// A cache hit for one item at the requested locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub translated_text: String,
    pub source_hash: String,
}

/// Operational snapshot of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Every locale with at least one entry, sorted
    pub locales: Vec<Lang>,
    /// Size of the entries serialized as one JSON document
    pub approximate_bytes: usize,
}

impl CacheStats {
    pub fn distinct_locales(&self) -> usize {
        self.locales.len()
    }
}

/// Client-side translation cache.
///
/// Storage failures never reach the caller: lookups degrade to misses and
/// writes to no-ops, with a warning logged.
#[derive(Clone)]
pub struct TranslationCache {
    store: Option<Arc<dyn TranslationStore>>,
}

impl TranslationCache {
    /// Create a cache from configuration, failing if the backend cannot open
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let store: Option<Arc<dyn TranslationStore>> = match config.backend {
            CacheBackend::Memory => Some(Arc::new(MemoryStore::new())),
            CacheBackend::Disk => {
                let path = config
                    .path
                    .clone()
                    .unwrap_or_else(crate::util::translation_db_path);
                Some(Arc::new(DiskStore::new(path)?))
            }
            CacheBackend::File => {
                let path = config
                    .path
                    .clone()
                    .unwrap_or_else(crate::util::translation_file_path);
                Some(Arc::new(JsonFileStore::new(path)?))
            }
            CacheBackend::Disabled => None,
        };

        Ok(Self { store })
    }

    /// Like [`TranslationCache::new`], but an unavailable backend yields a
    /// disabled cache instead of an error
    pub fn open(config: &CacheConfig) -> Self {
        Self::new(config).unwrap_or_else(|e| {
            warn!("Translation cache unavailable, continuing without it: {}", e);
            Self::disabled()
        })
    }

    pub fn with_store(store: Arc<dyn TranslationStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub const fn disabled() -> Self {
        Self { store: None }
    }

    pub const fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Stored translations for `items` at `locale`, keyed by content.
    ///
    /// Items without an entry are absent from the map.
    pub async fn lookup(
        &self,
        items: &[TranslationItem],
        locale: &Lang,
    ) -> HashMap<ContentKey, CacheHit> {
        let Some(store) = &self.store else {
            return HashMap::new();
        };

        let keys: Vec<CacheKey> = items.iter().map(|item| CacheKey::for_item(item, locale)).collect();

        let entries = match store.get_many(&keys).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cache read failed ({}): {}", store.name(), e);
                return HashMap::new();
            }
        };

        let hits: HashMap<ContentKey, CacheHit> = entries
            .into_iter()
            .filter(|entry| &entry.locale == locale)
            .map(|entry| {
                (
                    ContentKey::new(entry.content_type, entry.content_id),
                    CacheHit {
                        translated_text: entry.translated_text,
                        source_hash: entry.source_hash,
                    },
                )
            })
            .collect();

        debug!(
            "Found {}/{} cached translations for {}",
            hits.len(),
            items.len(),
            locale
        );
        hits
    }

    /// Upsert each entry by `(content_type, content_id, locale)`.
    pub async fn store(&self, entries: Vec<StoredTranslation>) {
        let Some(store) = &self.store else {
            return;
        };
        if entries.is_empty() {
            return;
        }

        let count = entries.len();
        match store.upsert_many(entries).await {
            Ok(()) => debug!("Saved {} translations to {} cache", count, store.name()),
            Err(e) => warn!("Cache write failed ({}): {}", store.name(), e),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let Some(store) = &self.store else {
            return CacheStats::default();
        };

        let entries = match store.entries().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cache stats unavailable ({}): {}", store.name(), e);
                return CacheStats::default();
            }
        };

        let locales: BTreeSet<Lang> = entries.iter().map(|e| e.locale.clone()).collect();
        let approximate_bytes = serde_json::to_vec(&entries).map_or(0, |bytes| bytes.len());

        CacheStats {
            total_entries: entries.len(),
            locales: locales.into_iter().collect(),
            approximate_bytes,
        }
    }

    /// Wipe every entry
    pub async fn clear(&self) {
        let Some(store) = &self.store else {
            return;
        };

        match store.clear().await {
            Ok(()) => debug!("Cleared {} cache", store.name()),
            Err(e) => warn!("Cache clear failed ({}): {}", store.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::Error;

    fn fr() -> Lang {
        Lang::new("fr")
    }

    fn entry(id: &str, locale: &str, translated: &str) -> StoredTranslation {
        StoredTranslation::new(&TranslationItem::new("ui", id, "src"), &Lang::new(locale), translated)
    }

    /// A store whose every operation fails, like storage that is disabled or full
    struct BrokenStore;

    #[async_trait]
    impl TranslationStore for BrokenStore {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn get_many(&self, _keys: &[CacheKey]) -> Result<Vec<StoredTranslation>> {
            Err(Error::CacheRead("quota exceeded".into()))
        }

        async fn upsert_many(&self, _entries: Vec<StoredTranslation>) -> Result<()> {
            Err(Error::CacheWrite("quota exceeded".into()))
        }

        async fn entries(&self) -> Result<Vec<StoredTranslation>> {
            Err(Error::CacheRead("quota exceeded".into()))
        }

        async fn clear(&self) -> Result<()> {
            Err(Error::CacheWrite("quota exceeded".into()))
        }
    }

    #[tokio::test]
    async fn test_lookup_only_matches_requested_locale() {
        let cache = TranslationCache::memory();
        cache
            .store(vec![entry("a", "fr", "A-fr"), entry("a", "de", "A-de")])
            .await;

        let hits = cache.lookup(&[TranslationItem::new("ui", "a", "src")], &fr()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[&ContentKey::new("ui", "a")].translated_text, "A-fr");
    }

    #[tokio::test]
    async fn test_lookup_misses_are_absent() {
        let cache = TranslationCache::memory();
        cache.store(vec![entry("a", "fr", "A")]).await;

        let items = [
            TranslationItem::new("ui", "a", "src"),
            TranslationItem::new("ui", "b", "src"),
            TranslationItem::new("story", "a", "src"),
        ];
        let hits = cache.lookup(&items, &fr()).await;
        assert_eq!(hits.len(), 1);
        assert!(hits.contains_key(&ContentKey::new("ui", "a")));
    }

    #[tokio::test]
    async fn test_store_merges_last_write_wins() {
        let cache = TranslationCache::memory();
        cache.store(vec![entry("a", "fr", "A"), entry("b", "fr", "B1")]).await;
        cache.store(vec![entry("b", "fr", "B2"), entry("c", "fr", "C")]).await;

        let items: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| TranslationItem::new("ui", *id, "src"))
            .collect();
        let hits = cache.lookup(&items, &fr()).await;

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[&ContentKey::new("ui", "a")].translated_text, "A");
        assert_eq!(hits[&ContentKey::new("ui", "b")].translated_text, "B2");
        assert_eq!(hits[&ContentKey::new("ui", "c")].translated_text, "C");
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let cache = TranslationCache::memory();
        cache
            .store(vec![entry("a", "fr", "A"), entry("a", "de", "A"), entry("b", "fr", "B")])
            .await;

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.locales, vec![Lang::new("de"), Lang::new("fr")]);
        assert_eq!(stats.distinct_locales(), 2);
        assert!(stats.approximate_bytes > 0);

        cache.clear().await;
        assert_eq!(cache.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_broken_storage_degrades_to_no_op() {
        let cache = TranslationCache::with_store(Arc::new(BrokenStore));
        cache.store(vec![entry("a", "fr", "A")]).await;

        let hits = cache.lookup(&[TranslationItem::new("ui", "a", "src")], &fr()).await;
        assert!(hits.is_empty());
        assert_eq!(cache.stats().await, CacheStats::default());
        cache.clear().await;
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let cache = TranslationCache::disabled();
        assert!(!cache.is_enabled());
        cache.store(vec![entry("a", "fr", "A")]).await;
        assert!(cache.lookup(&[TranslationItem::new("ui", "a", "src")], &fr()).await.is_empty());
    }

    #[test]
    fn test_unopenable_backend_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let config = CacheConfig {
            backend: CacheBackend::File,
            path: Some(blocker.join("translations.json")),
        };
        assert!(TranslationCache::new(&config).is_err());
        assert!(!TranslationCache::open(&config).is_enabled());
    }
}
