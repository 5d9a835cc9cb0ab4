//! Routes a batch across an ordered list of candidate models.
//!
//! A cursor shared by every call on the engine remembers where the last
//! rate limit left off: throttling on candidate `i` makes later calls start
//! at `i + 1`, and any success moves the cursor back to the primary model.
//! Other failures fall through to the next candidate within the same call
//! without moving the cursor.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::config::{CandidateBackend, Lang};
use crate::error::{Error, Result};
use crate::item::TranslationItem;
use crate::parser::parse_translations;
use super::prompt::build_prompt;
use super::traits::{BatchTranslator, ChatBackend, ChatPrompt, TranslationResult, TranslatorInfo};

/// Index of the candidate the next call starts from.
///
/// Concurrent updates may overwrite each other; reads are clamped so the
/// index always lands inside the candidate list.
#[derive(Debug, Default)]
pub struct FallbackCursor {
    index: AtomicUsize,
}

impl FallbackCursor {
    pub const fn new() -> Self {
        Self {
            index: AtomicUsize::new(0),
        }
    }

    /// Current start index for a list of `len` candidates
    pub fn current(&self, len: usize) -> usize {
        self.index.load(Ordering::Acquire).min(len.saturating_sub(1))
    }

    fn set(&self, index: usize) {
        self.index.store(index, Ordering::Release);
    }

    fn reset(&self) {
        self.set(0);
    }
}

pub struct FallbackEngine {
    backend: Arc<dyn ChatBackend>,
    candidates: Vec<CandidateBackend>,
    cursor: FallbackCursor,
}

impl FallbackEngine {
    pub fn new(backend: Arc<dyn ChatBackend>, candidates: Vec<CandidateBackend>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::ConfigInvalid {
                field: "translator.candidates".to_string(),
                reason: "at least one candidate backend is required".to_string(),
            });
        }

        Ok(Self {
            backend,
            candidates,
            cursor: FallbackCursor::new(),
        })
    }

    pub fn candidates(&self) -> &[CandidateBackend] {
        &self.candidates
    }

    /// Index of the candidate the next call will try first
    pub fn cursor(&self) -> usize {
        self.cursor.current(self.candidates.len())
    }

    /// One call against one candidate, decoded and costed.
    async fn attempt(
        &self,
        candidate: &CandidateBackend,
        prompt: &ChatPrompt,
        expected: usize,
    ) -> Result<TranslationResult> {
        let completion = self.backend.complete(candidate, prompt).await?;
        let translations = parse_translations(&completion.content)?;

        if translations.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: translations.len(),
            });
        }

        let usage = completion.usage;
        Ok(TranslationResult {
            translations,
            tokens_used: usage.total(),
            cost_usd: candidate.cost_usd(usage.input_tokens, usage.output_tokens),
            model_used: candidate.display_name.clone(),
        })
    }
}

#[async_trait]
impl BatchTranslator for FallbackEngine {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "LLM fallback",
            requires_api_key: true,
        }
    }

    async fn translate_batch(
        &self,
        items: &[TranslationItem],
        source: &Lang,
        target: &Lang,
    ) -> Result<TranslationResult> {
        if items.is_empty() {
            return Err(Error::InvalidRequest("no items to translate".to_string()));
        }

        let prompt = build_prompt(items, source, target)?;
        let len = self.candidates.len();
        let start = self.cursor.current(len);

        for (index, candidate) in self.candidates.iter().enumerate().skip(start) {
            let is_last = index + 1 == len;
            debug!("Trying {} ({}/{})", candidate.display_name, index + 1, len);

            match self.attempt(candidate, &prompt, items.len()).await {
                Ok(result) => {
                    self.cursor.reset();
                    info!(
                        "Translated {} items {} -> {} with {} ({} tokens, ${:.4})",
                        items.len(),
                        source,
                        target,
                        result.model_used,
                        result.tokens_used,
                        result.cost_usd
                    );
                    return Ok(result);
                }
                Err(e) if e.is_rate_limited() => {
                    if is_last {
                        // Start the next call from the primary again
                        self.cursor.reset();
                        warn!("All {} candidates rate limited", len - start);
                        return Err(Error::AllProvidersExhausted {
                            attempts: len - start,
                        });
                    }
                    warn!("Rate limited on {}, trying next model", candidate.display_name);
                    self.cursor.set(index + 1);
                }
                Err(e) => {
                    warn!("Error with {}: {}", candidate.display_name, e);
                    if is_last {
                        return Err(e);
                    }
                }
            }
        }

        Err(Error::AllProvidersExhausted {
            attempts: len - start,
        })
    }
}
