use anyhow::Result;
use audarma_core::stats::open_usage_store;
use audarma_core::{AppConfig, BatchTranslator, Error, UsageStore, create_translator};
use std::sync::Arc;
use tracing::warn;

/// Global application state
///
/// One translator is shared by every request, so the fallback cursor is
/// process-wide.
pub struct AppState {
    /// `None` when no API key is configured; translate requests then fail with 500
    pub translator: Option<Arc<dyn BatchTranslator>>,
    /// Usage counters, if enabled
    pub usage: Option<Arc<dyn UsageStore>>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let translator = match create_translator(&config.translator) {
            Ok(engine) => Some(engine as Arc<dyn BatchTranslator>),
            Err(Error::TranslationMissingApiKey) => {
                warn!("No API key configured, translation requests will fail");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            translator,
            usage: open_usage_store(&config.stats),
        })
    }

    /// Create with a custom translator and usage store
    pub fn with_translator(
        translator: Option<Arc<dyn BatchTranslator>>,
        usage: Option<Arc<dyn UsageStore>>,
    ) -> Self {
        Self { translator, usage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audarma_core::StatsBackend;

    fn config(api_key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.translator.api_key = api_key.map(str::to_string);
        config.stats.backend = StatsBackend::Disabled;
        config
    }

    #[test]
    fn test_missing_api_key_leaves_translator_unset() {
        let state = AppState::new(&config(None)).unwrap();
        assert!(state.translator.is_none());
        assert!(state.usage.is_none());
    }

    #[test]
    fn test_api_key_builds_shared_translator() {
        let state = AppState::new(&config(Some("key"))).unwrap();
        assert!(state.translator.is_some());
    }
}
