//! Single-document JSON store.
//!
//! The whole collection lives in one JSON array and is read and rewritten on
//! every `upsert_many`. An async mutex makes each rewrite one critical section
//! for every task sharing this store. Separate processes pointing at the same
//! file are not coordinated: the last rewrite wins for the whole document.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::key::{CacheKey, StoredTranslation};
use super::store::TranslationStore;
use crate::error::{Error, Result};

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::CacheInit(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        debug!("Using JSON file cache at {}", path.display());

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<StoredTranslation>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::CacheRead(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| Error::CacheRead(format!("{}: {e}", self.path.display())))
    }

    /// Replace the document atomically: write a sibling temp file, then rename.
    async fn write_all(&self, entries: &[StoredTranslation]) -> Result<()> {
        let bytes = serde_json::to_vec(entries).map_err(|e| Error::CacheWrite(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut tmp = tempfile::NamedTempFile::new_in(dir)
                .map_err(|e| Error::CacheWrite(e.to_string()))?;
            tmp.write_all(&bytes)
                .map_err(|e| Error::CacheWrite(e.to_string()))?;
            tmp.persist(&path)
                .map_err(|e| Error::CacheWrite(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::CacheWrite(e.to_string()))?
    }
}

/// Upsert `incoming` into `existing` by key, keeping untouched entries in place.
fn merge(existing: &mut Vec<StoredTranslation>, incoming: Vec<StoredTranslation>) {
    for entry in incoming {
        let key = entry.key();
        match existing.iter().position(|e| e.key() == key) {
            Some(index) => existing[index] = entry,
            None => existing.push(entry),
        }
    }
}

#[async_trait]
impl TranslationStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<StoredTranslation>> {
        let all = self.read_all().await?;
        Ok(all
            .into_iter()
            .filter(|entry| keys.contains(&entry.key()))
            .collect())
    }

    async fn upsert_many(&self, entries: Vec<StoredTranslation>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        let count = entries.len();
        merge(&mut all, entries);
        self.write_all(&all).await?;

        debug!("Saved {} translations ({} total)", count, all.len());
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<StoredTranslation>> {
        self.read_all().await
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
