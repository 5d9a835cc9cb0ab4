//! Audarma CLI - Command line tool for translating UI and content strings.

use anyhow::{Context, Result};
use audarma_core::{
    AppConfig, BatchTranslator, CacheBackend, Lang, RemoteApiTranslator, StatsBackend,
    TranslationItem, ViewTranslator, create_translator, supported_languages,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "audarma")]
#[command(author, version, about = "Translate UI and content strings with cached LLM calls", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a JSON array of items
    Translate(TranslateArgs),

    /// Inspect or clear the local translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show aggregate usage counters
    Stats,

    /// List supported locales
    Languages,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// JSON file of items ({"contentType", "contentId", "text"}), or "-" for stdin
    #[arg(short, long, default_value = "-")]
    items: PathBuf,

    /// Target language code
    #[arg(short = 't', long)]
    target: String,

    /// Source language code (default: from config)
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Translate through a running audarma-web server instead of calling the LLM directly
    #[arg(long, env = "AUDARMA_SERVER")]
    server: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "CEREBRAS_API_BASE")]
    api_base: Option<String>,

    /// API key
    #[arg(long, env = "CEREBRAS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable caching
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry count and locales
    Stats,
    /// Delete every cached translation
    Clear,
}

/// One translated item in the output document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedItem<'a> {
    content_type: &'a str,
    content_id: &'a str,
    text: &'a str,
    translated_text: &'a str,
}

fn read_items(path: &Path) -> Result<Vec<TranslationItem>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read items from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .context(format!("Failed to read items: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Items must be a JSON array of translation items")
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path).context("Failed to load config file"),
        None => AppConfig::load().context("Failed to load configuration"),
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn translate(mut config: AppConfig, args: TranslateArgs) -> Result<()> {
    if let Some(source) = &args.source {
        config.source_lang = Lang::new(source);
    }
    let target = Lang::new(&args.target);

    if args.no_cache {
        config.cache.backend = CacheBackend::Disabled;
    }
    if let Some(api_base) = args.api_base {
        config.translator.api_base = api_base;
    }
    if args.api_key.is_some() {
        config.translator.api_key = args.api_key;
    }

    let translator: Arc<dyn BatchTranslator> = if let Some(server) = &args.server {
        // The server keeps its own usage counters
        config.stats.backend = StatsBackend::Disabled;
        info!("Using translation server at {}", server);
        Arc::new(RemoteApiTranslator::new(server))
    } else {
        create_translator(&config.translator)
            .context("Failed to initialize translator (set CEREBRAS_API_KEY or use --server)")?
    };

    let items = read_items(&args.items)?;
    info!("Loaded {} items", items.len());

    let translator = ViewTranslator::with_translator(translator, &config);

    let pb = spinner(format!(
        "Translating {} items {} -> {}",
        items.len(),
        config.source_lang,
        target
    ));
    let view = translator
        .translate_view(&items, &config.source_lang, &target)
        .await;
    pb.finish_and_clear();
    let view = view.context("Translation failed")?;

    info!(
        "{} cached, {} translated ({} tokens, ${:.6})",
        view.from_cache, view.translated, view.tokens_used, view.cost_usd
    );

    let translated: Vec<TranslatedItem<'_>> = items
        .iter()
        .map(|item| TranslatedItem {
            content_type: &item.content_type,
            content_id: &item.content_id,
            text: &item.text,
            translated_text: view.text_for(item),
        })
        .collect();
    let json = serde_json::to_string_pretty(&translated)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .context(format!("Failed to write output: {}", path.display()))?;
            info!("Translations saved to {}", path.display());
        }
        // CLI output is intentional
        #[allow(clippy::print_stdout)]
        None => println!("{json}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Translate(translate_args) => translate(config, translate_args).await?,
        Command::Cache { action } => {
            let cache = audarma_core::TranslationCache::new(&config.cache)
                .context("Failed to open translation cache")?;
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats().await;
                    let locales: Vec<&str> = stats.locales.iter().map(Lang::as_str).collect();
                    #[allow(clippy::print_stdout)]
                    {
                        println!("Entries:  {}", stats.total_entries);
                        println!("Locales:  {}", locales.join(", "));
                        println!("Size:     ~{} bytes", stats.approximate_bytes);
                    }
                }
                CacheAction::Clear => {
                    cache.clear().await;
                    #[allow(clippy::print_stdout)]
                    {
                        println!("Translation cache cleared");
                    }
                }
            }
        }
        Command::Stats => {
            let totals = match audarma_core::stats::open_usage_store(&config.stats) {
                Some(store) => audarma_core::stats::snapshot_or_zero(store.as_ref()).await,
                None => audarma_core::UsageTotals::default(),
            };
            #[allow(clippy::print_stdout)]
            {
                println!("Translations: {}", totals.translations);
                println!("Tokens:       {}", totals.tokens);
                println!("Cost:         ${:.6}", totals.cost);
            }
        }
        Command::Languages => {
            #[allow(clippy::print_stdout)]
            {
                for lang in supported_languages() {
                    println!("{} {:<10} {}", lang.flag, lang.code, lang.name);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_items_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"contentType": "ui", "contentId": "title", "text": "Hello"}}]"#
        )
        .unwrap();

        let items = read_items(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_id, "title");
    }

    #[test]
    fn test_read_items_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"text": "Hello"}}"#).unwrap();
        assert!(read_items(file.path()).is_err());
    }

    #[test]
    fn test_parse_translate_args() {
        let args = Args::try_parse_from([
            "audarma", "translate", "--items", "items.json", "-t", "fr", "--no-cache",
        ])
        .unwrap();
        match args.command {
            Command::Translate(t) => {
                assert_eq!(t.target, "fr");
                assert!(t.no_cache);
                assert!(t.source.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
