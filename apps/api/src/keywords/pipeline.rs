//! Optimise pipeline — tokenize both documents, rank the overlap, highlight the resume.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keywords::highlight::{highlight, EmphasisMarker};
use crate::keywords::matcher::{match_keywords, KeywordMatch, ScoreBasis};
use crate::keywords::tokenizer::{tokenize, TokenizerOptions};

pub const EMPTY_INPUT_WARNING: &str = "Please provide both the job description and the resume.";
pub const NO_OVERLAP_WARNING: &str = "No job description keywords were found in the resume.";

/// Tunables for one optimise run. Defaults come from `Config`, requests may override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordOptions {
    #[serde(flatten)]
    pub tokenizer: TokenizerOptions,
    pub score_basis: ScoreBasis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimiseOutcome {
    pub matches: Vec<KeywordMatch>,
    pub highlighted_resume: String,
    pub warnings: Vec<String>,
}

impl OptimiseOutcome {
    /// True when either document had no usable text.
    pub fn is_empty_input(&self) -> bool {
        self.warnings.iter().any(|w| w == EMPTY_INPUT_WARNING)
    }
}

/// Runs the full keyword pipeline over a (job description, resume) pair.
///
/// Degenerate inputs never fail: blank documents or zero overlap yield an
/// empty match list, the resume text unchanged, and an explanatory warning.
pub fn optimise(
    jd_text: &str,
    resume_text: &str,
    options: &KeywordOptions,
    marker: &EmphasisMarker,
) -> OptimiseOutcome {
    if jd_text.trim().is_empty() || resume_text.trim().is_empty() {
        return OptimiseOutcome {
            matches: Vec::new(),
            highlighted_resume: resume_text.to_string(),
            warnings: vec![EMPTY_INPUT_WARNING.to_string()],
        };
    }

    let jd_tokens = tokenize(jd_text, &options.tokenizer);
    let resume_tokens = tokenize(resume_text, &options.tokenizer);
    let matches = match_keywords(&jd_tokens, &resume_tokens, options.score_basis);

    debug!(
        "Tokenized jd={} resume={} → {} matches ({:?})",
        jd_tokens.len(),
        resume_tokens.len(),
        matches.len(),
        options.score_basis
    );

    let mut warnings = Vec::new();
    if matches.is_empty() {
        warnings.push(NO_OVERLAP_WARNING.to_string());
    }

    let highlighted_resume = highlight(resume_text, &matches, marker);

    OptimiseOutcome {
        matches,
        highlighted_resume,
        warnings,
    }
}
