//! Matcher/Ranker — overlapping keywords between a job description and a resume,
//! ranked by a frequency-derived priority score.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A keyword present in both documents, with its priority score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub score: u32,
}

impl KeywordMatch {
    pub fn new(keyword: impl Into<String>, score: u32) -> Self {
        Self {
            keyword: keyword.into(),
            score,
        }
    }
}

/// Which document's frequency becomes the match score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBasis {
    /// Occurrences in the job description (importance to the target role).
    #[default]
    JobFrequency,
    /// Occurrences in the resume.
    ResumeFrequency,
}

impl std::str::FromStr for ScoreBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" | "job_frequency" => Ok(ScoreBasis::JobFrequency),
            "resume" | "resume_frequency" => Ok(ScoreBasis::ResumeFrequency),
            other => Err(format!("unknown score basis '{other}' (expected 'job' or 'resume')")),
        }
    }
}

/// Counts occurrences of each token.
pub fn frequency_table(tokens: &[String]) -> HashMap<&str, u32> {
    let mut table: HashMap<&str, u32> = HashMap::new();
    for token in tokens {
        *table.entry(token.as_str()).or_insert(0) += 1;
    }
    table
}

/// Builds the ranked list of keywords shared by both token sequences.
///
/// Ordering: score descending, then keyword ascending. Each keyword appears
/// once. Either side empty, or no overlap, gives an empty list.
pub fn match_keywords(
    jd_tokens: &[String],
    resume_tokens: &[String],
    basis: ScoreBasis,
) -> Vec<KeywordMatch> {
    if jd_tokens.is_empty() || resume_tokens.is_empty() {
        return Vec::new();
    }

    let jd_counts = frequency_table(jd_tokens);
    let mut matches: Vec<KeywordMatch> = match basis {
        ScoreBasis::JobFrequency => {
            let in_resume: HashSet<&str> = resume_tokens.iter().map(String::as_str).collect();
            jd_counts
                .iter()
                .filter(|(token, _)| in_resume.contains(*token))
                .map(|(token, count)| KeywordMatch::new(*token, *count))
                .collect()
        }
        ScoreBasis::ResumeFrequency => frequency_table(resume_tokens)
            .into_iter()
            .filter(|(token, _)| jd_counts.contains_key(token))
            .map(|(token, count)| KeywordMatch::new(token, count))
            .collect(),
    };

    sort_ranked(&mut matches);
    matches
}

/// Score descending, keyword ascending. Tokens are lowercase already, so plain
/// string order is the case-insensitive order.
pub fn sort_ranked(matches: &mut [KeywordMatch]) {
    matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.keyword.cmp(&b.keyword)));
}
