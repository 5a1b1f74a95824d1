//! Axum route handlers for document export.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::documents::export::{export_document, ExportFormat};
use crate::errors::AppError;
use crate::keywords::EmphasisMarker;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Highlighted resume text, markers included.
    pub text: String,
    pub format: ExportFormat,
    #[serde(default)]
    pub marker: Option<EmphasisMarker>,
}

/// POST /api/v1/export
///
/// Renders highlighted resume text as a downloadable PDF, Markdown or plain-text file.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    if request.text.len() > state.config.max_input_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "text exceeds {} bytes",
            state.config.max_input_bytes
        )));
    }

    let marker = request.marker.unwrap_or_default();
    if !marker.is_usable() {
        return Err(AppError::Validation(
            "marker.open and marker.close must not be empty".to_string(),
        ));
    }
    let format = request.format;
    let text = request.text;

    // PDF layout is CPU-bound; spawn_blocking to avoid blocking the async executor.
    let document = tokio::task::spawn_blocking(move || export_document(&text, format, &marker))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    info!(
        "Exported {} ({} bytes)",
        document.file_name,
        document.bytes.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
