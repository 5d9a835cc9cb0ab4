use async_trait::async_trait;
use moka::future::Cache;

use super::key::{CacheKey, StoredTranslation};
use super::store::TranslationStore;
use crate::error::Result;

/// In-memory store using moka. Unbounded and without TTL: entries live
/// until `clear` or process exit.
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<CacheKey, StoredTranslation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<StoredTranslation>> {
        let mut found = Vec::new();
        for key in keys {
            if let Some(entry) = self.cache.get(key).await {
                found.push(entry);
            }
        }
        Ok(found)
    }

    async fn upsert_many(&self, entries: Vec<StoredTranslation>) -> Result<()> {
        for entry in entries {
            self.cache.insert(entry.key(), entry).await;
        }
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<StoredTranslation>> {
        Ok(self.cache.iter().map(|(_, entry)| entry).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}
