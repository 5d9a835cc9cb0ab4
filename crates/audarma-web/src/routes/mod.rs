//! HTTP route handlers for the translation server.
//!
//! All routes speak JSON.

mod stats;
mod translate;

pub use stats::get_stats;
pub use translate::translate_batch;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

/// API routes without middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/translate", post(translate_batch))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}
