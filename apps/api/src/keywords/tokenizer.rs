//! Tokenizer — turns raw document text into a sequence of normalized keyword tokens.
//!
//! Output preserves source order and duplicates, so the same sequence feeds both
//! frequency counting (matcher) and whole-word highlighting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Letters only. A run glued to a digit or underscore (`python3`) has no
/// boundary on that side and yields nothing.
static LETTER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{L}+\b").unwrap());

/// Letters, digits and underscore.
static ALNUM_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Closed set of English function words removed when `remove_stopwords` is on.
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "among", "and", "any", "are", "been",
    "before", "being", "below", "between", "both", "but", "can", "could", "did", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its", "itself",
    "just", "more", "most", "must", "nor", "not", "now", "off", "once", "only", "other", "our",
    "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "too", "under", "until", "upon", "very", "was", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "within",
    "would", "you", "your", "yours", "yourself", "yourselves",
];

pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Minimum token length, counted in characters.
    pub min_token_len: usize,
    /// Accept digits and underscore inside tokens.
    pub allow_digits: bool,
    pub remove_stopwords: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            allow_digits: false,
            remove_stopwords: false,
        }
    }
}

/// Returns true if `word` (already lowercase) is in the stopword set.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// Extracts lowercase keyword tokens from `text` in source order, duplicates kept.
///
/// Never fails: text with no extractable words yields an empty vec.
pub fn tokenize(text: &str, options: &TokenizerOptions) -> Vec<String> {
    let lowered = text.to_lowercase();
    let pattern: &Regex = if options.allow_digits {
        &ALNUM_WORD
    } else {
        &LETTER_WORD
    };

    pattern
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() >= options.min_token_len)
        .filter(|word| !(options.remove_stopwords && is_stopword(word)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> TokenizerOptions {
        TokenizerOptions::default()
    }

    #[test]
    fn test_stopwords_are_sorted_for_binary_search() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }

    #[test]
    fn test_tokenize_is_case_insensitive() {
        assert_eq!(tokenize("Cloud", &defaults()), tokenize("cloud", &defaults()));
        assert_eq!(tokenize("CLOUD", &defaults()), vec!["cloud"]);
    }

    #[test]
    fn test_short_runs_are_discarded() {
        let tokens = tokenize("Go is a fun language, so is C", &defaults());
        assert_eq!(tokens, vec!["fun", "language"]);
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let tokens = tokenize("Rust, rust and RUST again", &defaults());
        assert_eq!(tokens, vec!["rust", "rust", "and", "rust", "again"]);
    }

    #[test]
    fn test_punctuation_and_newlines_split_words() {
        let tokens = tokenize("SQL/NoSQL\nmicro-services; (docker)", &defaults());
        assert_eq!(tokens, vec!["sql", "nosql", "micro", "services", "docker"]);
    }

    #[test]
    fn test_letters_mode_skips_words_glued_to_digits() {
        let tokens = tokenize("python3 and k8s plus html5", &defaults());
        assert_eq!(tokens, vec!["and", "plus"]);
    }

    #[test]
    fn test_alnum_mode_keeps_digits() {
        let options = TokenizerOptions {
            allow_digits: true,
            ..defaults()
        };
        let tokens = tokenize("python3 and k8s plus html5", &options);
        assert_eq!(tokens, vec!["python3", "and", "k8s", "plus", "html5"]);
    }

    #[test]
    fn test_stopwords_removed_only_when_enabled() {
        let text = "Experience with the cloud and Kubernetes";
        assert_eq!(
            tokenize(text, &defaults()),
            vec!["experience", "with", "the", "cloud", "and", "kubernetes"]
        );

        let options = TokenizerOptions {
            remove_stopwords: true,
            ..defaults()
        };
        assert_eq!(
            tokenize(text, &options),
            vec!["experience", "cloud", "kubernetes"]
        );
    }

    #[test]
    fn test_min_len_counts_characters_not_bytes() {
        let options = TokenizerOptions {
            min_token_len: 4,
            ..defaults()
        };
        assert_eq!(tokenize("café über rust", &options), vec!["café", "über", "rust"]);
        assert!(tokenize("élan", &TokenizerOptions { min_token_len: 5, ..defaults() }).is_empty());
    }

    #[test]
    fn test_empty_and_symbol_only_text_yields_nothing() {
        assert!(tokenize("", &defaults()).is_empty());
        assert!(tokenize("   \n\t ", &defaults()).is_empty());
        assert!(tokenize("12 34 -- !!", &defaults()).is_empty());
    }
}
