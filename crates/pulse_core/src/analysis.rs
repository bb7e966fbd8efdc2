use crate::lexicon::Lexicon;
use crate::schema::{AnalysisRecord, Sentiment, SubmissionRecord, now_timestamp};
use uuid::Uuid;

/// Summary stored when an upstream analyzer call failed and the record is
/// filled in at the boundary instead.
pub const FAILURE_SUMMARY: &str = "Analysis failed due to a network or server error.";

const SUMMARY_ELLIPSIS: &str = "...";

/// Derived fields for one comment, before identity and timestamp are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentAnalysis {
    pub summary: String,
    pub sentiment: Sentiment,
    pub keywords: Vec<String>,
}

/// Supplies identifiers for new analysis records. Injected so tests can pin
/// deterministic ids; the default draws UUID v4 values.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

pub struct Analyzer {
    lexicon: Lexicon,
    ids: Box<dyn IdSource>,
}

impl Analyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self::with_id_source(lexicon, Box::new(UuidSource))
    }

    pub fn with_id_source(lexicon: Lexicon, ids: Box<dyn IdSource>) -> Self {
        Self { lexicon, ids }
    }

    /// Run the pipeline over one submission's comment and emit the stored
    /// record, keyed back to the submission.
    pub fn analyze(&mut self, submission: &SubmissionRecord) -> AnalysisRecord {
        let analysis = analyze_comment(&submission.comment, &self.lexicon);
        AnalysisRecord {
            id: self.ids.next_id(),
            submission_id: submission.id.clone(),
            full_comment: submission.comment.clone(),
            summary: analysis.summary,
            sentiment: analysis.sentiment,
            keywords: analysis.keywords,
            created_at: now_timestamp(),
        }
    }

    /// Boundary mapping for a failed upstream analyzer call: a well-formed
    /// record with Unknown sentiment instead of a propagated error.
    pub fn failed(&mut self, submission: &SubmissionRecord) -> AnalysisRecord {
        AnalysisRecord {
            id: self.ids.next_id(),
            submission_id: submission.id.clone(),
            full_comment: submission.comment.clone(),
            summary: FAILURE_SUMMARY.to_string(),
            sentiment: Sentiment::Unknown,
            keywords: vec!["error".to_string()],
            created_at: now_timestamp(),
        }
    }
}

/// Derive summary, sentiment, and keywords for one comment. Total over all
/// inputs: the empty string yields Neutral sentiment, the default keyword
/// list, and an empty summary.
pub fn analyze_comment(comment: &str, lexicon: &Lexicon) -> CommentAnalysis {
    let tokens = normalize_tokens(comment);
    CommentAnalysis {
        summary: summarize(comment, lexicon.config.summary_cap),
        sentiment: score_sentiment(&tokens, lexicon),
        keywords: extract_keywords(&tokens, lexicon),
    }
}

/// Lowercase, strip everything that is neither alphanumeric nor whitespace,
/// split on whitespace.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

/// Keyword candidates are tokens longer than 3 characters, purely alphabetic,
/// and not stopwords; deduplicated in first-occurrence order and capped.
/// Never returns an empty list.
pub fn extract_keywords(tokens: &[String], lexicon: &Lexicon) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        if keywords.len() == lexicon.config.max_keywords {
            break;
        }
        if token.chars().count() <= 3 {
            continue;
        }
        if !token.chars().all(|c| c.is_alphabetic()) {
            continue;
        }
        if lexicon.is_stopword(token) {
            continue;
        }
        if keywords.iter().any(|kept| kept == token) {
            continue;
        }
        keywords.push(token.clone());
    }

    if keywords.is_empty() {
        keywords = lexicon.config.default_keywords.clone();
    }
    keywords
}

/// Count tokens containing any positive-marker substring against tokens
/// containing any negative-marker substring. A token may hit both lists;
/// ties, including the all-zero case, are Neutral.
pub fn score_sentiment(tokens: &[String], lexicon: &Lexicon) -> Sentiment {
    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in tokens {
        if lexicon.positive_markers.iter().any(|m| token.contains(m.as_str())) {
            positive += 1;
        }
        if lexicon.negative_markers.iter().any(|m| token.contains(m.as_str())) {
            negative += 1;
        }
    }
    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// First `cap` characters of the original comment, with an ellipsis marker
/// when truncated; the comment verbatim otherwise.
pub fn summarize(comment: &str, cap: usize) -> String {
    if comment.chars().count() <= cap {
        return comment.to_string();
    }
    let mut summary: String = comment.chars().take(cap).collect();
    summary.push_str(SUMMARY_ELLIPSIS);
    summary
}
