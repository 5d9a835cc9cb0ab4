//! Aggregate usage counters.

use audarma_core::UsageTotals;
use audarma_core::stats::snapshot_or_zero;
use axum::{Json, extract::State};
use std::sync::Arc;

use crate::state::AppState;

/// Current totals; zeros when stats are disabled or unreadable.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<UsageTotals> {
    let totals = match &state.usage {
        Some(store) => snapshot_or_zero(store.as_ref()).await,
        None => UsageTotals::default(),
    };
    Json(totals)
}
