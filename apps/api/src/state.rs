use std::sync::Arc;

use crate::config::Config;
use crate::documents::TextExtractor;
use crate::history::HistoryLog;
use crate::keywords::EmphasisMarker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable upload → text backend. Default: FileTextExtractor.
    pub extractor: Arc<dyn TextExtractor>,
    /// Per-session optimise history, in memory only.
    pub history: HistoryLog,
    pub marker: EmphasisMarker,
}
