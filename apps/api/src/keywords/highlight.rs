//! Highlighter: wraps every whole-word occurrence of a matched keyword in an
//! emphasis marker pair.
//!
//! One scan over the word runs of the text handles all keywords at once. A run
//! is wrapped when its lowercase form is a keyword, so a keyword can never be
//! clobbered by a shorter one that is its prefix, and the cost does not grow
//! with the size of the keyword set. A run that already sits between `open`
//! and `close`, or inside a marker string itself, is left alone, which makes
//! highlighting idempotent.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::keywords::matcher::KeywordMatch;

/// Same word definition as `\b` boundaries use.
static WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Opening and closing emphasis markers. Defaults to Markdown bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmphasisMarker {
    pub open: String,
    pub close: String,
}

impl Default for EmphasisMarker {
    fn default() -> Self {
        Self {
            open: "**".to_string(),
            close: "**".to_string(),
        }
    }
}

impl EmphasisMarker {
    /// Both markers must be non-empty to delimit anything.
    pub fn is_usable(&self) -> bool {
        !self.open.is_empty() && !self.close.is_empty()
    }

    /// Removes every marker from `text`.
    pub fn strip(&self, text: &str) -> String {
        if !self.is_usable() {
            return text.to_string();
        }
        let stripped = text.replace(&self.open, "");
        if self.close == self.open {
            stripped
        } else {
            stripped.replace(&self.close, "")
        }
    }

    /// True when `text[start..end]` is directly preceded by `open` and followed by `close`.
    fn wraps(&self, text: &str, start: usize, end: usize) -> bool {
        text[..start].ends_with(&self.open) && text[end..].starts_with(&self.close)
    }

    /// Byte mask of every position covered by a marker string in `text`.
    fn coverage(&self, text: &str) -> Vec<bool> {
        let mut covered = vec![false; text.len()];
        for needle in [&self.open, &self.close] {
            for (at, found) in text.match_indices(needle.as_str()) {
                covered[at..at + found.len()].fill(true);
            }
        }
        covered
    }
}

/// Returns `text` with each matched keyword wrapped in `marker`, case-insensitive,
/// whole words only. Line breaks and all other characters are preserved.
///
/// Keywords are word tokens; one containing non-word characters never matches.
pub fn highlight(text: &str, matches: &[KeywordMatch], marker: &EmphasisMarker) -> String {
    let keywords: HashSet<String> = matches
        .iter()
        .filter(|m| !m.keyword.is_empty())
        .map(|m| m.keyword.to_lowercase())
        .collect();
    if keywords.is_empty() || !marker.is_usable() {
        return text.to_string();
    }

    let covered = marker.coverage(text);
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut last = 0;

    for run in WORD_RUN.find_iter(text) {
        let (start, end) = (run.start(), run.end());
        if !keywords.contains(&run.as_str().to_lowercase())
            || covered[start..end].contains(&true)
            || marker.wraps(text, start, end)
        {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(&marker.open);
        out.push_str(run.as_str());
        out.push_str(&marker.close);
        last = end;
    }

    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(keyword: &str) -> KeywordMatch {
        KeywordMatch::new(keyword, 1)
    }

    fn bold() -> EmphasisMarker {
        EmphasisMarker::default()
    }

    #[test]
    fn test_whole_word_only() {
        let out = highlight("cloudy day", &[m("cloud")], &bold());
        assert_eq!(out, "cloudy day");

        let out = highlight("cloud, clouds and cloud.", &[m("cloud")], &bold());
        assert_eq!(out, "**cloud**, clouds and **cloud**.");
    }

    #[test]
    fn test_case_insensitive_keeps_original_casing() {
        let out = highlight("Python and PYTHON and python", &[m("python")], &bold());
        assert_eq!(out, "**Python** and **PYTHON** and **python**");
    }

    #[test]
    fn test_python_developer_scenario() {
        let matches = vec![
            KeywordMatch::new("python", 2),
            KeywordMatch::new("cloud", 1),
            KeywordMatch::new("developer", 1),
        ];
        let out = highlight(
            "Experienced Python developer skilled in cloud deployments",
            &matches,
            &bold(),
        );
        assert_eq!(
            out,
            "Experienced **Python** **developer** skilled in **cloud** deployments"
        );
    }

    #[test]
    fn test_longer_keyword_not_clobbered_by_prefix() {
        let matches = vec![m("manage"), m("management")];
        let out = highlight("Project management: manage teams", &matches, &bold());
        assert_eq!(out, "Project **management**: **manage** teams");
    }

    #[test]
    fn test_idempotent() {
        let matches = vec![m("rust"), m("tokio"), m("async"), m("manage"), m("management")];
        let text = "Rust engineer.\nAsync Rust with Tokio; management and manage.\n";
        let once = highlight(text, &matches, &bold());
        let twice = highlight(&once, &matches, &bold());
        assert_eq!(once, twice);
        assert_eq!(
            once,
            "**Rust** engineer.\n**Async** **Rust** with **Tokio**; **management** and **manage**.\n"
        );
    }

    #[test]
    fn test_idempotent_with_custom_marker() {
        let marker = EmphasisMarker {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        };
        let matches = vec![m("sql")];
        let once = highlight("SQL and NoSQL, sql.", &matches, &marker);
        assert_eq!(once, "<mark>SQL</mark> and NoSQL, <mark>sql</mark>.");
        assert_eq!(highlight(&once, &matches, &marker), once);
    }

    #[test]
    fn test_formatting_preserved() {
        let text = "  Skills:\r\n\t- Docker\n\n- Kubernetes  ";
        let out = highlight(text, &[m("docker")], &bold());
        assert_eq!(out, "  Skills:\r\n\t- **Docker**\n\n- Kubernetes  ");
        assert_eq!(bold().strip(&out), text);
    }

    #[test]
    fn test_empty_matches_returns_text_unchanged() {
        let text = "Nothing to see **here**";
        assert_eq!(highlight(text, &[], &bold()), text);
        assert_eq!(highlight("", &[m("rust")], &bold()), "");
    }

    #[test]
    fn test_keyword_must_be_the_whole_word_run() {
        let out = highlight("rust_lang rust2 rust-lang rust", &[m("rust")], &bold());
        assert_eq!(out, "rust_lang rust2 **rust**-lang **rust**");
    }

    #[test]
    fn test_idempotent_with_stray_marker() {
        let matches = vec![m("python")];
        let once = highlight("x ** python", &matches, &bold());
        assert_eq!(once, "x ** **python**");
        assert_eq!(highlight(&once, &matches, &bold()), once);

        let once = highlight("2 ** 8 in python and **go", &matches, &bold());
        let twice = highlight(&once, &matches, &bold());
        assert_eq!(once, twice);
        assert_eq!(once, "2 ** 8 in **python** and **go");
    }

    #[test]
    fn test_stray_marker_glued_to_keyword() {
        let matches = vec![m("python")];
        let once = highlight("x **python", &matches, &bold());
        assert_eq!(once, "x ****python**");
        assert_eq!(highlight(&once, &matches, &bold()), once);
    }

    #[test]
    fn test_marker_text_is_never_highlighted() {
        let marker = EmphasisMarker {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        };
        let matches = vec![m("mark"), m("sql")];
        let once = highlight("Mark knows SQL", &matches, &marker);
        assert_eq!(once, "<mark>Mark</mark> knows <mark>SQL</mark>");
        assert_eq!(highlight(&once, &matches, &marker), once);
    }

    #[test]
    fn test_large_keyword_set_is_fully_highlighted() {
        // Letter-only terms: aaa, aab, ... so each is a distinct word run.
        let terms: Vec<String> = (0..40_000u32)
            .map(|n| {
                let mut word = String::from("kw");
                let mut v = n;
                for _ in 0..4 {
                    word.push(char::from(b'a' + (v % 26) as u8));
                    v /= 26;
                }
                word
            })
            .collect();
        let matches: Vec<KeywordMatch> = terms.iter().map(|t| KeywordMatch::new(t, 1)).collect();
        let text = terms.join(" ");
        assert!(text.len() > 200_000);

        let once = highlight(&text, &matches, &bold());
        let expected = terms
            .iter()
            .map(|t| format!("**{t}**"))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(once, expected);
        assert_eq!(highlight(&once, &matches, &bold()), once);
    }

    #[test]
    fn test_empty_marker_leaves_text_unchanged() {
        let marker = EmphasisMarker {
            open: String::new(),
            close: String::new(),
        };
        assert!(!marker.is_usable());
        assert_eq!(highlight("python", &[m("python")], &marker), "python");
        assert_eq!(marker.strip("python"), "python");
    }

    #[test]
    fn test_strip_removes_distinct_markers() {
        let marker = EmphasisMarker {
            open: "[".to_string(),
            close: "]".to_string(),
        };
        assert_eq!(marker.strip("[Rust] and [Go]"), "Rust and Go");
    }
}
