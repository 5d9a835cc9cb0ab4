mod fallback;
mod openai;
pub mod prompt;
mod remote;
mod traits;

pub use fallback::{FallbackCursor, FallbackEngine};
pub use openai::OpenAiBackend;
pub use remote::RemoteApiTranslator;
pub use traits::{
    BatchTranslator, ChatBackend, ChatPrompt, Completion, TokenUsage, TranslationResult,
    TranslatorInfo,
};

use crate::config::TranslatorConfig;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Create the fallback engine over an OpenAI-compatible API from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<FallbackEngine>> {
    if config.api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
        return Err(Error::TranslationMissingApiKey);
    }

    let backend = OpenAiBackend::from_config(config)?;
    let engine = FallbackEngine::new(Arc::new(backend), config.candidates.clone())?;

    Ok(Arc::new(engine))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = TranslatorConfig::new("http://localhost:8080/v1", None);
        assert!(matches!(
            create_translator(&config),
            Err(Error::TranslationMissingApiKey)
        ));

        let blank = TranslatorConfig::new("http://localhost:8080/v1", Some("  ".to_string()));
        assert!(matches!(
            create_translator(&blank),
            Err(Error::TranslationMissingApiKey)
        ));
    }

    #[test]
    fn test_engine_uses_configured_candidates() {
        let config = TranslatorConfig::new("http://localhost:8080/v1", Some("key".to_string()));
        let engine = create_translator(&config).unwrap();
        assert_eq!(engine.candidates().len(), config.candidates.len());
        assert_eq!(engine.cursor(), 0);
    }
}
