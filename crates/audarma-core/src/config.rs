use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Locale identifiers (ISO 639 codes, plus private-use tags like `mis-x-dot`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A locale is usable once it has at least one non-blank character.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

fn default_source_lang() -> Lang {
    Lang::new(DEFAULT_SOURCE_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A translation backend the fallback engine may route a batch to.
///
/// The order of `TranslatorConfig::candidates` is the fallback order: the
/// first entry is the primary (cheapest) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBackend {
    /// Model identifier sent to the API
    pub id: String,
    /// Human-readable model name, reported as `model_used`
    pub display_name: String,
    /// USD per million prompt tokens
    pub input_cost_per_million_tokens: f64,
    /// USD per million completion tokens
    pub output_cost_per_million_tokens: f64,
}

impl CandidateBackend {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        input_cost_per_million_tokens: f64,
        output_cost_per_million_tokens: f64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            input_cost_per_million_tokens,
            output_cost_per_million_tokens,
        }
    }

    /// Cost in USD of a call that consumed the given token counts.
    #[allow(clippy::cast_precision_loss)]
    pub fn cost_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million_tokens
            + (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million_tokens
    }
}

/// Cerebras free-tier models, cheapest first.
pub fn default_candidates() -> Vec<CandidateBackend> {
    vec![
        CandidateBackend::new("qwen-3-32b", "Qwen3-32B", 0.40, 0.80),
        CandidateBackend::new("qwen-3-235b-a22b-instruct-2507", "Qwen3-235B", 0.60, 1.20),
    ]
}

/// Translator backend configuration for OpenAI-compatible chat APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout; unset means the caller imposes its own deadline
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<CandidateBackend>,
}

impl TranslatorConfig {
    /// Create a new translator config with the default candidate list
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            ..Default::default()
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: None,
            candidates: default_candidates(),
        }
    }
}

/// Which storage the translation cache lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process only, lost on exit
    Memory,
    /// sled database directory
    #[default]
    Disk,
    /// A single JSON document rewritten on every store
    File,
    /// No caching at all
    Disabled,
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Storage location (defaults under ~/.cache/audarma)
    pub path: Option<PathBuf>,
}

/// Which storage the usage counters live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsBackend {
    Memory,
    #[default]
    Disk,
    Disabled,
}

/// Usage accounting configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub backend: StatsBackend,

    /// Storage location (defaults under ~/.cache/audarma)
    pub path: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language the content is authored in
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Locales offered to readers
    #[serde(default = "default_supported_locales")]
    pub supported_locales: Vec<Lang>,

    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Usage accounting configuration
    #[serde(default)]
    pub stats: StatsConfig,
}

fn default_supported_locales() -> Vec<Lang> {
    supported_languages().iter().map(|l| Lang::new(l.code)).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            supported_locales: default_supported_locales(),
            translator: TranslatorConfig::default(),
            cache: CacheConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Layer ~/.config/audarma/config.toml, ./config.toml and `AUDARMA__*`
    /// environment variables (e.g. `AUDARMA__TRANSLATOR__API_KEY`).
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("audarma").join("config.toml");
            builder = builder.add_source(config::File::from(user_config).required(false));
        }

        let config: Self = builder
            .add_source(config::File::from(PathBuf::from("config.toml")).required(false))
            .add_source(
                config::Environment::with_prefix("AUDARMA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;

        config.validate()?;
        tracing::debug!(
            "Loaded config: {} candidates, cache={:?}, stats={:?}",
            config.translator.candidates.len(),
            config.cache.backend,
            config.stats.backend
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.translator.candidates.is_empty() {
            return Err(Error::ConfigInvalid {
                field: "translator.candidates".to_string(),
                reason: "at least one candidate backend is required".to_string(),
            });
        }

        if let Some(c) = self
            .translator
            .candidates
            .iter()
            .find(|c| c.input_cost_per_million_tokens < 0.0 || c.output_cost_per_million_tokens < 0.0)
        {
            return Err(Error::ConfigInvalid {
                field: "translator.candidates".to_string(),
                reason: format!("negative token cost for {}", c.id),
            });
        }

        if self.source_lang.is_blank() {
            return Err(Error::ConfigInvalid {
                field: "source_lang".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// A locale offered by the language switcher
#[derive(Debug, Clone)]
pub struct LanguageOption {
    /// Locale code (e.g., "en", "qya", "mis-x-dot")
    pub code: &'static str,
    /// Native display name
    pub name: &'static str,
    /// Flag or emblem shown next to the name
    pub flag: &'static str,
}

/// Locales the demo page can be read in.
pub fn supported_languages() -> Vec<LanguageOption> {
    vec![
        LanguageOption { code: "en", name: "English", flag: "🇬🇧" },
        LanguageOption { code: "es", name: "Español", flag: "🇪🇸" },
        LanguageOption { code: "fr", name: "Français", flag: "🇫🇷" },
        LanguageOption { code: "de", name: "Deutsch", flag: "🇩🇪" },
        LanguageOption { code: "kk", name: "Қазақша", flag: "🇰🇿" },
        LanguageOption { code: "ja", name: "日本語", flag: "🇯🇵" },
        LanguageOption { code: "la", name: "Latina", flag: "🏛️" },
        LanguageOption { code: "qya", name: "Quenya", flag: "🧝" },
        LanguageOption { code: "mis-x-dot", name: "Dothraki", flag: "🐎" },
        LanguageOption { code: "tlh", name: "tlhIngan Hol", flag: "🖖" },
    ]
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "en";
/// Default OpenAI-compatible endpoint
pub const DEFAULT_API_BASE: &str = "https://api.cerebras.ai/v1";
