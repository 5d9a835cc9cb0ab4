use async_trait::async_trait;

use super::key::{CacheKey, StoredTranslation};
use crate::error::Result;

/// Keyed storage behind the translation cache.
///
/// Implementations must upsert per key: an `upsert_many` call replaces the
/// entries it names and leaves every other key untouched.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Fetch the entries that exist for `keys`; absent keys are skipped.
    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<StoredTranslation>>;

    /// Insert or replace each entry by its key, as one logical write.
    async fn upsert_many(&self, entries: Vec<StoredTranslation>) -> Result<()>;

    /// Every stored entry, in no particular order
    async fn entries(&self) -> Result<Vec<StoredTranslation>>;

    /// Remove everything
    async fn clear(&self) -> Result<()>;
}
