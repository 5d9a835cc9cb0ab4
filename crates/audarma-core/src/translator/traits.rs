use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{CandidateBackend, Lang};
use crate::error::Result;
use crate::item::TranslationItem;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this translator requires an API key
    pub requires_api_key: bool,
}

/// Outcome of translating one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Same length and order as the input batch
    pub translations: Vec<String>,
    pub tokens_used: u64,
    pub cost_usd: f64,
    /// Display name of the model that produced the translations
    pub model_used: String,
}

/// Trait for batch translation backends
#[async_trait]
pub trait BatchTranslator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate every item's text, preserving order element for element
    async fn translate_batch(
        &self,
        items: &[TranslationItem],
        source: &Lang,
        target: &Lang,
    ) -> Result<TranslationResult>;
}

/// A chat request: one system instruction and one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Token counters reported by the backend; absent counters are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub const fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Raw assistant reply before parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// One chat-completion call against a specific model.
///
/// Throttling must surface as `Error::TranslationRateLimited` so the
/// fallback engine can tell it apart from other failures.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: &CandidateBackend, prompt: &ChatPrompt) -> Result<Completion>;
}
