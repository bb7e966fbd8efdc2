use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub district: String,
    pub state: String,
    pub subject: String,
    pub comment: String,
    pub created_at: String, // ISO-8601 timestamp (UTC)
}

impl SubmissionRecord {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        district: impl Into<String>,
        state: impl Into<String>,
        subject: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            district: district.into(),
            state: state.into(),
            subject: subject.into(),
            comment: comment.into(),
            created_at: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl Sentiment {
    /// Lowercase canonical label, also the storage encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }

    /// Case-insensitive; anything unrecognized maps to Unknown.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "neutral" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    pub id: String,            // generated per analysis, independent of the submission id
    pub submission_id: String, // foreign key to SubmissionRecord.id, set at creation
    pub full_comment: String,
    pub summary: String,
    pub sentiment: Sentiment,
    pub keywords: Vec<String>, // deduplicated, never empty
    pub created_at: String,    // ISO-8601 timestamp (UTC)
}

pub fn now_timestamp() -> String {
    // Rfc3339 formatting of a UTC OffsetDateTime does not fail in practice.
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_parse_is_case_insensitive() {
        assert_eq!(Sentiment::parse("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::parse("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::parse("neutral"), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_parse_never_fails() {
        assert_eq!(Sentiment::parse(""), Sentiment::Unknown);
        assert_eq!(Sentiment::parse("mixed"), Sentiment::Unknown);
    }

    #[test]
    fn sentiment_round_trips_through_label() {
        for s in [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Unknown,
        ] {
            assert_eq!(Sentiment::parse(s.as_str()), s);
        }
    }

    #[test]
    fn new_submission_gets_distinct_ids() {
        let a = SubmissionRecord::new("A", "a@example.com", "Pune", "Maharashtra", "Roads", "x");
        let b = SubmissionRecord::new("B", "b@example.com", "Pune", "Maharashtra", "Roads", "x");
        assert_ne!(a.id, b.id);
        assert!(!a.created_at.is_empty());
    }
}
