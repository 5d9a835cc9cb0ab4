//! Batch translation endpoint.

use audarma_core::{Error, Lang, TranslationItem, UsageEvent, record_usage, validate_request};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::helpers::{ResultExt, RouteResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub items: Option<Vec<TranslationItem>>,
    #[serde(default)]
    pub source_locale: Option<Lang>,
    #[serde(default)]
    pub target_locale: Option<Lang>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateMeta {
    pub tokens: u64,
    pub cost: f64,
    pub model: String,
    pub item_count: usize,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub translations: Vec<String>,
    pub meta: TranslateMeta,
}

/// Translate a batch of items with the shared fallback engine.
///
/// The caller owns caching; this endpoint always reaches the backend.
pub async fn translate_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> RouteResult<Json<TranslateResponse>> {
    let Json(request) = payload.or_status()?;
    let items = request
        .items
        .ok_or_else(|| Error::InvalidRequest("invalid items".to_string()))
        .or_status()?;
    let source = request.source_locale.unwrap_or_default();
    let target = request.target_locale.unwrap_or_default();

    validate_request(&items, &source, &target).or_status()?;

    let translator = state
        .translator
        .as_ref()
        .ok_or(Error::TranslationMissingApiKey)
        .or_status()?;

    debug!(
        "translate_batch: {} items, {} -> {}",
        items.len(),
        source,
        target
    );

    let result = translator
        .translate_batch(&items, &source, &target)
        .await
        .inspect_err(|e| error!("Translation failed: {}", e))
        .or_status()?;

    if let Some(usage) = &state.usage {
        record_usage(
            usage.as_ref(),
            UsageEvent {
                items_translated: items.len(),
                tokens: result.tokens_used,
                cost_usd: result.cost_usd,
            },
        )
        .await;
    }

    info!(
        "Translated {} items to {} with {}",
        items.len(),
        target,
        result.model_used
    );

    Ok(Json(TranslateResponse {
        success: true,
        meta: TranslateMeta {
            tokens: result.tokens_used,
            cost: result.cost_usd,
            model: result.model_used,
            item_count: items.len(),
        },
        translations: result.translations,
    }))
}
