//! Axum route handlers for the optimise API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::history::HistoryRecord;
use crate::keywords::matcher::KeywordMatch;
use crate::keywords::pipeline::{optimise, KeywordOptions, EMPTY_INPUT_WARNING};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimiseRequest {
    pub jd_text: String,
    pub resume_text: String,
    /// Omit to start a new session; the minted id comes back in the response.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// Replaces the configured keyword options for this request.
    #[serde(default)]
    pub options: Option<KeywordOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimiseResponse {
    pub session_id: Uuid,
    pub matches: Vec<KeywordMatch>,
    pub match_count: usize,
    pub highlighted_resume: String,
    pub warnings: Vec<String>,
}

/// Both documents as plain text, whatever their source.
struct OptimiseInput {
    jd_text: String,
    resume_text: String,
    session_id: Option<Uuid>,
    options: Option<KeywordOptions>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/optimise
///
/// Ranks the job-description keywords found in the resume and returns the
/// highlighted resume. Records a summary in the session history.
pub async fn handle_optimise(
    State(state): State<AppState>,
    Json(request): Json<OptimiseRequest>,
) -> Result<Json<OptimiseResponse>, AppError> {
    let input = OptimiseInput {
        jd_text: request.jd_text,
        resume_text: request.resume_text,
        session_id: request.session_id,
        options: request.options,
    };
    run_optimise(&state, input).await.map(Json)
}

/// POST /api/v1/optimise/upload
///
/// Multipart variant. Fields: `jd_file` or `jd_text`, `resume_file` or
/// `resume_text`, optional `session_id`, optional `options` (JSON).
/// A non-empty file field wins over the text field for the same document.
pub async fn handle_optimise_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OptimiseResponse>, AppError> {
    let mut jd_file: Option<UploadedDocument> = None;
    let mut resume_file: Option<UploadedDocument> = None;
    let mut jd_text = String::new();
    let mut resume_text = String::new();
    let mut session_id: Option<Uuid> = None;
    let mut options: Option<KeywordOptions> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        match name.as_str() {
            // Browsers send an empty part for a file input left blank.
            "jd_file" | "resume_file"
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) => {}
            "jd_file" | "resume_file" => {
                let document = UploadedDocument {
                    file_name,
                    content_type,
                    bytes,
                };
                if name == "jd_file" {
                    jd_file = Some(document);
                } else {
                    resume_file = Some(document);
                }
            }
            "jd_text" => jd_text = String::from_utf8_lossy(&bytes).into_owned(),
            "resume_text" => resume_text = String::from_utf8_lossy(&bytes).into_owned(),
            "session_id" => {
                let raw = String::from_utf8_lossy(&bytes);
                let id = raw
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation(format!("Invalid session_id '{raw}'")))?;
                session_id = Some(id);
            }
            "options" => {
                let parsed = serde_json::from_slice::<KeywordOptions>(&bytes)
                    .map_err(|e| AppError::Validation(format!("Invalid options: {e}")))?;
                options = Some(parsed);
            }
            _ => {} // ignore unknown fields
        }
    }

    if let Some(document) = jd_file {
        jd_text = state.extractor.extract(&document).await?;
    }
    if let Some(document) = resume_file {
        resume_text = state.extractor.extract(&document).await?;
    }

    let input = OptimiseInput {
        jd_text,
        resume_text,
        session_id,
        options,
    };
    run_optimise(&state, input).await.map(Json)
}

// ────────────────────────────────────────────────────────────────────────────
// Shared flow
// ────────────────────────────────────────────────────────────────────────────

async fn run_optimise(state: &AppState, input: OptimiseInput) -> Result<OptimiseResponse, AppError> {
    let limit = state.config.max_input_bytes;
    for (label, text) in [("jd_text", &input.jd_text), ("resume_text", &input.resume_text)] {
        if text.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "{label} exceeds {limit} bytes"
            )));
        }
    }

    let options = input
        .options
        .unwrap_or_else(|| state.config.keywords.clone());
    let outcome = optimise(&input.jd_text, &input.resume_text, &options, &state.marker);

    if outcome.is_empty_input() {
        return Err(AppError::Validation(EMPTY_INPUT_WARNING.to_string()));
    }

    let session_id = input.session_id.unwrap_or_else(Uuid::new_v4);
    let match_count = outcome.matches.len();
    state
        .history
        .append(
            session_id,
            HistoryRecord::new(&input.jd_text, match_count, Utc::now()),
        )
        .await;

    info!("Optimised resume for session {session_id}: {match_count} keywords matched");

    Ok(OptimiseResponse {
        session_id,
        matches: outcome.matches,
        match_count,
        highlighted_resume: outcome.highlighted_resume,
        warnings: outcome.warnings,
    })
}
