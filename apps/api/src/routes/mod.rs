pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::history::handlers as history;
use crate::keywords::handlers as keywords;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Keyword matching
        .route("/api/v1/optimise", post(keywords::handle_optimise))
        .route(
            "/api/v1/optimise/upload",
            post(keywords::handle_optimise_upload),
        )
        // Session history
        .route(
            "/api/v1/history/:session_id",
            get(history::handle_get_history),
        )
        // Export
        .route("/api/v1/export", post(documents::handle_export))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
