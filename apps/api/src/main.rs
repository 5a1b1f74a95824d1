mod config;
mod documents;
mod errors;
mod history;
mod keywords;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::FileTextExtractor;
use crate::history::HistoryLog;
use crate::keywords::EmphasisMarker;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimiser v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Keyword defaults: min_len={} digits={} stopwords={} score={:?}",
        config.keywords.tokenizer.min_token_len,
        config.keywords.tokenizer.allow_digits,
        config.keywords.tokenizer.remove_stopwords,
        config.keywords.score_basis
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        extractor: Arc::new(FileTextExtractor),
        history: HistoryLog::with_limits(config.history),
        marker: EmphasisMarker::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
