//! Per-session optimise history. In-memory only; lost on restart.
//!
//! The log is owned by `AppState` and handed to handlers explicitly. The keyword
//! core never touches it. Memory is bounded: each session keeps its newest
//! `max_records` entries, and once `max_sessions` sessions exist the least
//! recently appended one is dropped to make room for a new one.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Characters of the job description kept as the record title.
const TITLE_CHARS: usize = 30;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_MAX_RECORDS: usize = 50;

/// Summary of a single optimise run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub jd_title: String,
    pub timestamp: DateTime<Utc>,
    pub keyword_count: usize,
}

impl HistoryRecord {
    pub fn new(jd_text: &str, keyword_count: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            jd_title: summarize_title(jd_text),
            timestamp,
            keyword_count,
        }
    }
}

/// One row of the newest-first history listing.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryView {
    /// 1-based position, 1 = most recent.
    pub position: usize,
    pub jd_title: String,
    /// Minute precision, `%Y-%m-%d %H:%M`.
    pub timestamp: String,
    pub keyword_count: usize,
    pub summary: String,
}

/// First 30 characters of the job description followed by `...`.
pub fn summarize_title(jd_text: &str) -> String {
    let head: String = jd_text.chars().take(TITLE_CHARS).collect();
    format!("{head}...")
}

/// Size bounds for a [`HistoryLog`]. Zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_sessions: usize,
    pub max_records: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

#[derive(Debug, Default)]
struct SessionRecords {
    records: VecDeque<HistoryRecord>,
    /// Value of `Sessions::clock` at the last append.
    last_append: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<Uuid, SessionRecords>,
    clock: u64,
}

/// Append-only log of history records, keyed by session.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    sessions: Arc<RwLock<Sessions>>,
    limits: HistoryLimits,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_limits(HistoryLimits::default())
    }
}

impl HistoryLog {
    pub fn with_limits(limits: HistoryLimits) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            limits: HistoryLimits {
                max_sessions: limits.max_sessions.max(1),
                max_records: limits.max_records.max(1),
            },
        }
    }

    pub async fn append(&self, session_id: Uuid, record: HistoryRecord) {
        let mut sessions = self.sessions.write().await;
        sessions.clock += 1;
        let now = sessions.clock;

        if !sessions.by_id.contains_key(&session_id)
            && sessions.by_id.len() >= self.limits.max_sessions
        {
            let idle = sessions
                .by_id
                .iter()
                .min_by_key(|(_, s)| s.last_append)
                .map(|(id, _)| *id);
            if let Some(idle) = idle {
                sessions.by_id.remove(&idle);
                debug!("Evicted history for idle session {idle}");
            }
        }

        let entry = sessions.by_id.entry(session_id).or_default();
        entry.last_append = now;
        entry.records.push_back(record);
        while entry.records.len() > self.limits.max_records {
            entry.records.pop_front();
        }
    }

    /// Records for a session in insertion order. Unknown sessions yield an empty vec.
    pub async fn records(&self, session_id: Uuid) -> Vec<HistoryRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .by_id
            .get(&session_id)
            .map(|s| s.records.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }

    /// Newest-first listing with 1-based positions.
    pub async fn recent(&self, session_id: Uuid) -> Vec<HistoryEntryView> {
        self.records(session_id)
            .await
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, record)| to_view(i + 1, record))
            .collect()
    }
}

fn to_view(position: usize, record: HistoryRecord) -> HistoryEntryView {
    let timestamp = record.timestamp.format("%Y-%m-%d %H:%M").to_string();
    let summary = format!(
        "{position}. {} | {timestamp} | {} keywords matched",
        record.jd_title, record.keyword_count
    );
    HistoryEntryView {
        position,
        jd_title: record.jd_title,
        timestamp,
        keyword_count: record.keyword_count,
        summary,
    }
}
