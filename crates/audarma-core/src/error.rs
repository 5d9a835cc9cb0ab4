use thiserror::Error;

/// Unified error type for audarma-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Request validation (empty batches, missing locales)
/// - Translation operations (API requests, responses, rate limiting, fallback)
/// - Cache operations (initialization, reading, writing)
/// - Usage accounting
/// - Configuration operations (loading, validation)
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Request Errors
    // ==========================================================================
    /// The batch is empty, an item has no text, or a locale is missing
    #[error("invalid translation request: {0}")]
    InvalidRequest(String),

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed (network, non-success status)
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response envelope from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Rate limited by translation API
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    TranslationRateLimited { retry_after: Option<u64> },

    /// API key not configured for translation service
    #[error("translation API key not configured")]
    TranslationMissingApiKey,

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    /// The completion text did not contain a usable JSON array of strings
    #[error("failed to parse translations from completion: {0}")]
    ResponseParse(String),

    /// The backend returned a different number of translations than requested
    #[error("expected {expected} translations, backend returned {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Every candidate backend reported rate limiting
    #[error("all {attempts} translation backends are rate limited, try again later")]
    AllProvidersExhausted { attempts: usize },

    // ==========================================================================
    // Cache Errors
    // ==========================================================================
    /// Failed to initialize the cache
    #[error("failed to initialize cache: {0}")]
    CacheInit(String),

    /// Failed to read from cache
    #[error("failed to read from cache: {0}")]
    CacheRead(String),

    /// Failed to write to cache
    #[error("failed to write to cache: {0}")]
    CacheWrite(String),

    // ==========================================================================
    // Usage Accounting Errors
    // ==========================================================================
    /// Failed to update or read the shared usage counters
    #[error("failed to update usage stats: {0}")]
    StatsUpdate(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this failure is backend throttling.
    ///
    /// Only throttling advances the persisted fallback cursor.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::TranslationRateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display_with_retry_after() {
        let err = Error::TranslationRateLimited { retry_after: Some(30) };
        assert_eq!(err.to_string(), "translation rate limited, retry after 30 seconds");

        let err = Error::TranslationRateLimited { retry_after: None };
        assert_eq!(err.to_string(), "translation rate limited");
    }

    #[test]
    fn test_only_throttling_counts_as_rate_limited() {
        assert!(Error::TranslationRateLimited { retry_after: None }.is_rate_limited());
        assert!(!Error::TranslationRequest("boom".into()).is_rate_limited());
        assert!(!Error::ResponseParse("bad".into()).is_rate_limited());
        assert!(!Error::AllProvidersExhausted { attempts: 2 }.is_rate_limited());
    }
}
