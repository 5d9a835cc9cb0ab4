//! Aggregate usage accounting.
//!
//! Three counters (items translated, tokens, USD cost) live under one fixed
//! counter name. Updates are best-effort: [`record_usage`] never fails the
//! caller, and the three increments are independent, not a transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{StatsBackend, StatsConfig};
use crate::error::{Error, Result};

/// Name the counters are stored under
pub const COUNTER_NAME: &str = "stats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageField {
    Translations,
    Tokens,
    Cost,
}

impl UsageField {
    pub const ALL: [Self; 3] = [Self::Translations, Self::Tokens, Self::Cost];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Translations => "translations",
            Self::Tokens => "tokens",
            Self::Cost => "cost",
        }
    }
}

/// Current totals; absent counters read as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub translations: u64,
    pub tokens: u64,
    pub cost: f64,
}

impl UsageTotals {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_fields(fields: &HashMap<UsageField, f64>) -> Self {
        let get = |field| fields.get(&field).copied().unwrap_or(0.0).max(0.0);
        Self {
            translations: get(UsageField::Translations).round() as u64,
            tokens: get(UsageField::Tokens).round() as u64,
            cost: get(UsageField::Cost),
        }
    }
}

/// What one successful batch consumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageEvent {
    pub items_translated: usize,
    pub tokens: u64,
    pub cost_usd: f64,
}

/// Shared counter store
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn increment(&self, field: UsageField, amount: f64) -> Result<()>;

    async fn snapshot(&self) -> Result<UsageTotals>;
}

/// Counters held in process memory
#[derive(Default)]
pub struct MemoryUsageStore {
    fields: Mutex<HashMap<UsageField, f64>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn increment(&self, field: UsageField, amount: f64) -> Result<()> {
        *self.fields.lock().await.entry(field).or_insert(0.0) += amount;
        Ok(())
    }

    async fn snapshot(&self) -> Result<UsageTotals> {
        Ok(UsageTotals::from_fields(&*self.fields.lock().await))
    }
}

/// Counters in a sled tree named [`COUNTER_NAME`]; each increment is an
/// atomic read-modify-write on its own field.
pub struct DiskUsageStore {
    tree: sled::Tree,
}

impl DiskUsageStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StatsUpdate(format!(
                    "Failed to create stats directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            Error::StatsUpdate(format!("Failed to open stats at {}: {}", path.display(), e))
        })?;
        let tree = db
            .open_tree(COUNTER_NAME)
            .map_err(|e| Error::StatsUpdate(e.to_string()))?;

        Ok(Self { tree })
    }
}

fn decode_f64(bytes: &[u8]) -> Option<f64> {
    <[u8; 8]>::try_from(bytes).ok().map(f64::from_le_bytes)
}

#[async_trait]
impl UsageStore for DiskUsageStore {
    async fn increment(&self, field: UsageField, amount: f64) -> Result<()> {
        self.tree
            .update_and_fetch(field.as_str(), |old| {
                let current = old.and_then(decode_f64).unwrap_or(0.0);
                Some((current + amount).to_le_bytes().to_vec())
            })
            .map_err(|e| Error::StatsUpdate(e.to_string()))?;

        self.tree
            .flush_async()
            .await
            .map_err(|e| Error::StatsUpdate(format!("Flush failed: {e}")))?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<UsageTotals> {
        let mut fields = HashMap::new();
        for field in UsageField::ALL {
            let value = self
                .tree
                .get(field.as_str())
                .map_err(|e| Error::StatsUpdate(e.to_string()))?;
            if let Some(value) = value.as_deref().and_then(decode_f64) {
                fields.insert(field, value);
            }
        }
        Ok(UsageTotals::from_fields(&fields))
    }
}

/// Open the configured usage store; `None` when disabled or unavailable
pub fn open_usage_store(config: &StatsConfig) -> Option<Arc<dyn UsageStore>> {
    match config.backend {
        StatsBackend::Memory => Some(Arc::new(MemoryUsageStore::new())),
        StatsBackend::Disk => {
            let path = config.path.clone().unwrap_or_else(crate::util::stats_db_path);
            match DiskUsageStore::new(path) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!("Usage stats unavailable, continuing without them: {}", e);
                    None
                }
            }
        }
        StatsBackend::Disabled => None,
    }
}

/// Apply the three increments concurrently. Failures are logged, never returned.
#[allow(clippy::cast_precision_loss)]
pub async fn record_usage(store: &dyn UsageStore, event: UsageEvent) {
    let (translations, tokens, cost) = futures::join!(
        store.increment(UsageField::Translations, event.items_translated as f64),
        store.increment(UsageField::Tokens, event.tokens as f64),
        store.increment(UsageField::Cost, event.cost_usd),
    );

    let mut failed = false;
    for (field, outcome) in [
        (UsageField::Translations, translations),
        (UsageField::Tokens, tokens),
        (UsageField::Cost, cost),
    ] {
        if let Err(e) = outcome {
            failed = true;
            warn!("Error updating {} counter: {}", field.as_str(), e);
        }
    }

    if !failed {
        info!(
            "Stats updated: +{} translations, +{} tokens, +${:.4}",
            event.items_translated, event.tokens, event.cost_usd
        );
    }
}

/// Current totals, or zeros if the store cannot be read
pub async fn snapshot_or_zero(store: &dyn UsageStore) -> UsageTotals {
    store.snapshot().await.unwrap_or_else(|e| {
        warn!("Error reading usage stats: {}", e);
        UsageTotals::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl UsageStore for FailingStore {
        async fn increment(&self, _field: UsageField, _amount: f64) -> Result<()> {
            Err(Error::StatsUpdate("kv offline".into()))
        }

        async fn snapshot(&self) -> Result<UsageTotals> {
            Err(Error::StatsUpdate("kv offline".into()))
        }
    }

    fn event(items: usize, tokens: u64, cost: f64) -> UsageEvent {
        UsageEvent {
            items_translated: items,
            tokens,
            cost_usd: cost,
        }
    }

    #[tokio::test]
    async fn test_empty_store_snapshot_is_zero() {
        let store = MemoryUsageStore::new();
        assert_eq!(store.snapshot().await.unwrap(), UsageTotals::default());
    }

    #[tokio::test]
    async fn test_memory_store_accumulates() {
        let store = MemoryUsageStore::new();
        record_usage(&store, event(3, 15, 0.0008)).await;
        record_usage(&store, event(2, 10, 0.0002)).await;

        let totals = store.snapshot().await.unwrap();
        assert_eq!(totals.translations, 5);
        assert_eq!(totals.tokens, 25);
        assert!((totals.cost - 0.001).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_disk_store_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUsageStore::new(dir.path().join("stats")).unwrap();
        record_usage(&store, event(1, 15, 0.5)).await;
        record_usage(&store, event(1, 5, 0.25)).await;

        let totals = store.snapshot().await.unwrap();
        assert_eq!(totals.translations, 2);
        assert_eq!(totals.tokens, 20);
        assert!((totals.cost - 0.75).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_failures_are_absorbed() {
        record_usage(&FailingStore, event(1, 1, 0.1)).await;
        assert_eq!(snapshot_or_zero(&FailingStore).await, UsageTotals::default());
    }

    #[test]
    fn test_disabled_backend_opens_nothing() {
        let config = StatsConfig {
            backend: StatsBackend::Disabled,
            path: None,
        };
        assert!(open_usage_store(&config).is_none());
    }
}
