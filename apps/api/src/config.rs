use std::str::FromStr;

use anyhow::{Context, Result};

use crate::history::log::{DEFAULT_MAX_RECORDS, DEFAULT_MAX_SESSIONS};
use crate::history::HistoryLimits;
use crate::keywords::{KeywordOptions, ScoreBasis, TokenizerOptions};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on each document's text, in bytes.
    pub max_input_bytes: usize,
    /// Upper bound on a whole request body (multipart uploads included).
    pub max_upload_bytes: usize,
    /// Default keyword options; requests may override them.
    pub keywords: KeywordOptions,
    /// Bounds on the in-memory session history.
    pub history: HistoryLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_input_bytes: parse_env("MAX_INPUT_BYTES", 1024 * 1024)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            keywords: KeywordOptions {
                tokenizer: TokenizerOptions {
                    min_token_len: parse_env("MIN_TOKEN_LEN", 3)?,
                    allow_digits: parse_env("ALLOW_DIGITS", false)?,
                    remove_stopwords: parse_env("REMOVE_STOPWORDS", false)?,
                },
                score_basis: parse_env("SCORE_BASIS", ScoreBasis::JobFrequency)?,
            },
            history: HistoryLimits {
                max_sessions: parse_env("HISTORY_MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
                max_records: parse_env("HISTORY_MAX_RECORDS", DEFAULT_MAX_RECORDS)?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_input_bytes: 1024 * 1024,
            max_upload_bytes: 10 * 1024 * 1024,
            keywords: KeywordOptions::default(),
            history: HistoryLimits::default(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
