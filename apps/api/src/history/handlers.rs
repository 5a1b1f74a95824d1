use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::log::HistoryEntryView;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub entries: Vec<HistoryEntryView>,
}

/// GET /api/v1/history/:session_id
///
/// Newest-first summaries of this session's optimise runs. An unknown session
/// simply has no history yet.
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = state.history.recent(session_id).await;
    Ok(Json(HistoryResponse {
        session_id,
        entries,
    }))
}
