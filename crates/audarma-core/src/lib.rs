//! Audarma Core Library
//!
//! Cached LLM translation of UI and content strings:
//! - Response parsing of free-form LLM completions
//! - Provider fallback across models with different cost/rate-limit profiles
//! - Client-side translation cache (memory, sled, or a single JSON document)
//! - Best-effort aggregate usage accounting

pub mod cache;
pub mod config;
pub mod error;
pub mod item;
pub mod parser;
pub mod stats;
pub mod translator;
pub mod util;

pub use cache::{CacheHit, CacheKey, CacheStats, StoredTranslation, TranslationCache, source_hash};
pub use config::{
    AppConfig, CacheBackend, CacheConfig, CandidateBackend, Lang, LanguageOption, StatsBackend,
    StatsConfig, TranslatorConfig, supported_languages, DEFAULT_SOURCE_LANG,
};
pub use error::{Error, Result};
pub use item::{ContentKey, TranslationItem};
pub use parser::parse_translations;
pub use stats::{UsageEvent, UsageStore, UsageTotals, record_usage};
pub use translator::{
    BatchTranslator, FallbackEngine, RemoteApiTranslator, TranslationResult, create_translator,
};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Reject requests the pipeline must never send to a backend.
pub fn validate_request(items: &[TranslationItem], source: &Lang, target: &Lang) -> Result<()> {
    if items.is_empty() {
        return Err(Error::InvalidRequest("no items to translate".to_string()));
    }

    if source.is_blank() || target.is_blank() {
        return Err(Error::InvalidRequest("missing locale".to_string()));
    }

    if let Some(item) = items.iter().find(|item| item.text.trim().is_empty()) {
        return Err(Error::InvalidRequest(format!("empty text for {}", item.key())));
    }

    Ok(())
}

/// High-level view translator that combines all components
pub struct ViewTranslator {
    translator: Arc<dyn BatchTranslator>,
    cache: TranslationCache,
    usage: Option<Arc<dyn UsageStore>>,
}

/// Result of translating one view's worth of items
#[derive(Debug, Clone, Default)]
pub struct TranslatedView {
    /// Translated text per item
    pub texts: HashMap<ContentKey, String>,
    /// Items served from cache
    pub from_cache: usize,
    /// Items sent to the backend
    pub translated: usize,
    /// Model that handled the cache misses, if any were sent
    pub model_used: Option<String>,
    pub tokens_used: u64,
    pub cost_usd: f64,
}

impl TranslatedView {
    pub fn get(&self, key: &ContentKey) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Translated text for `item`, or its source text if absent
    pub fn text_for<'a>(&'a self, item: &'a TranslationItem) -> &'a str {
        self.get(&item.key()).unwrap_or(&item.text)
    }
}

impl ViewTranslator {
    /// Create a view translator with the given configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let translator = create_translator(&config.translator)?;
        Ok(Self::with_translator(translator, config))
    }

    /// Create with a custom translator; cache and stats come from configuration
    pub fn with_translator(translator: Arc<dyn BatchTranslator>, config: &AppConfig) -> Self {
        Self {
            translator,
            cache: TranslationCache::open(&config.cache),
            usage: stats::open_usage_store(&config.stats),
        }
    }

    /// Create from explicit parts (for sharing a cache or stats store)
    pub fn from_parts(
        translator: Arc<dyn BatchTranslator>,
        cache: TranslationCache,
        usage: Option<Arc<dyn UsageStore>>,
    ) -> Self {
        Self {
            translator,
            cache,
            usage,
        }
    }

    /// Translate `items` into `target`, calling the backend only for cache misses.
    ///
    /// On failure nothing is written to the cache.
    pub async fn translate_view(
        &self,
        items: &[TranslationItem],
        source: &Lang,
        target: &Lang,
    ) -> Result<TranslatedView> {
        validate_request(items, source, target)?;

        if source == target {
            debug!("Source and target are both {}, returning source text", target);
            return Ok(TranslatedView {
                texts: items.iter().map(|item| (item.key(), item.text.clone())).collect(),
                ..Default::default()
            });
        }

        let hits = self.cache.lookup(items, target).await;

        let mut view = TranslatedView::default();
        let mut pending = Vec::new();
        for item in items {
            match hits.get(&item.key()) {
                Some(hit) => {
                    view.texts.insert(item.key(), hit.translated_text.clone());
                    view.from_cache += 1;
                }
                None => pending.push(item.clone()),
            }
        }

        if pending.is_empty() {
            debug!("All {} items cached for {}", items.len(), target);
            return Ok(view);
        }

        info!(
            "Translating {} of {} items from {} to {} with {}",
            pending.len(),
            items.len(),
            source,
            target,
            self.translator.name()
        );

        let result = self
            .translator
            .translate_batch(&pending, source, target)
            .await?;

        if result.translations.len() != pending.len() {
            return Err(Error::LengthMismatch {
                expected: pending.len(),
                actual: result.translations.len(),
            });
        }

        let entries = pending
            .iter()
            .zip(&result.translations)
            .map(|(item, translated)| StoredTranslation::new(item, target, translated.clone()))
            .collect();
        self.cache.store(entries).await;

        for (item, translated) in pending.iter().zip(result.translations) {
            view.texts.insert(item.key(), translated);
        }
        view.translated = pending.len();
        view.tokens_used = result.tokens_used;
        view.cost_usd = result.cost_usd;
        view.model_used = Some(result.model_used);

        if let Some(usage) = &self.usage {
            record_usage(
                usage.as_ref(),
                UsageEvent {
                    items_translated: pending.len(),
                    tokens: view.tokens_used,
                    cost_usd: view.cost_usd,
                },
            )
            .await;
        }

        Ok(view)
    }

    pub const fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Aggregate usage totals; zeros when stats are disabled or unreadable
    pub async fn usage_totals(&self) -> UsageTotals {
        match &self.usage {
            Some(store) => stats::snapshot_or_zero(store.as_ref()).await,
            None => UsageTotals::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source_lang.as_str(), "en");
        assert_eq!(config.translator.candidates.len(), 2);
    }

    #[test]
    fn test_validate_request() {
        let en = Lang::new("en");
        let fr = Lang::new("fr");
        let items = vec![TranslationItem::new("ui", "x", "Hello")];

        assert!(validate_request(&items, &en, &fr).is_ok());
        assert!(matches!(validate_request(&[], &en, &fr), Err(Error::InvalidRequest(_))));
        assert!(matches!(
            validate_request(&items, &en, &Lang::new("")),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request(&[TranslationItem::new("ui", "x", "  ")], &en, &fr),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_text_for_falls_back_to_source() {
        let view = TranslatedView::default();
        let item = TranslationItem::new("ui", "x", "Hello");
        assert_eq!(view.text_for(&item), "Hello");
    }
}
