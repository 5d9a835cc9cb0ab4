use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use tracing::{debug, warn};

use super::key::{CacheKey, StoredTranslation};
use super::store::TranslationStore;
use crate::error::{Error, Result};

/// Disk-based store using sled. One `upsert_many` is one atomic batch.
pub struct DiskStore {
    db: Db,
}

impl DiskStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::CacheInit(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            let err_str = e.to_string();
            // Detect lock errors and provide actionable fix
            if err_str.contains("WouldBlock") || err_str.contains("lock") {
                Error::CacheInit(format!(
                    "Cache locked at {}\n\n\
                    Another process is using the cache, or a previous instance crashed.\n\
                    To fix: rm {}/db/LOCK",
                    path.display(),
                    path.display()
                ))
            } else {
                Error::CacheInit(format!("Failed to open cache at {}: {}", path.display(), e))
            }
        })?;

        debug!("Opened disk cache at {}", path.display());

        Ok(Self { db })
    }

    fn decode(bytes: &[u8]) -> Option<StoredTranslation> {
        match serde_json::from_slice(bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping undecodable cache entry: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl TranslationStore for DiskStore {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<StoredTranslation>> {
        let mut found = Vec::new();
        for key in keys {
            let value = self
                .db
                .get(key.to_bytes())
                .map_err(|e| Error::CacheRead(e.to_string()))?;
            if let Some(entry) = value.and_then(|v| Self::decode(&v)) {
                found.push(entry);
            }
        }
        Ok(found)
    }

    async fn upsert_many(&self, entries: Vec<StoredTranslation>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for entry in &entries {
            let value =
                serde_json::to_vec(entry).map_err(|e| Error::CacheWrite(e.to_string()))?;
            batch.insert(entry.key().to_bytes(), value);
        }

        self.db
            .apply_batch(batch)
            .map_err(|e| Error::CacheWrite(e.to_string()))?;

        // Flush to ensure persistence
        self.db
            .flush_async()
            .await
            .map_err(|e| Error::CacheWrite(format!("Flush failed: {e}")))?;

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<StoredTranslation>> {
        let mut all = Vec::with_capacity(self.db.len());
        for item in self.db.iter() {
            let (_, value) = item.map_err(|e| Error::CacheRead(e.to_string()))?;
            if let Some(entry) = Self::decode(&value) {
                all.push(entry);
            }
        }
        Ok(all)
    }

    async fn clear(&self) -> Result<()> {
        self.db.clear().map_err(|e| Error::CacheWrite(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| Error::CacheWrite(format!("Flush failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lang;
    use crate::item::TranslationItem;

    fn entry(id: &str, translated: &str) -> StoredTranslation {
        StoredTranslation::new(&TranslationItem::new("ui", id, "src"), &Lang::new("fr"), translated)
    }

    #[tokio::test]
    async fn test_disk_store_batch_upsert_replaces_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().join("db")).unwrap();

        store.upsert_many(vec![entry("a", "A1"), entry("b", "B")]).await.unwrap();
        store.upsert_many(vec![entry("a", "A2")]).await.unwrap();

        let found = store.get_many(&[entry("a", "").key()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].translated_text, "A2");
        assert_eq!(store.entries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_disk_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().join("db")).unwrap();
        store.upsert_many(vec![entry("a", "A"), entry("b", "B")]).await.unwrap();
        assert_eq!(store.entries().await.unwrap().len(), 2);

        store.clear().await.unwrap();
        assert!(store.entries().await.unwrap().is_empty());
    }
}
