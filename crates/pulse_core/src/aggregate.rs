use crate::analysis::normalize_tokens;
use crate::lexicon::AnalysisConfig;
use crate::schema::{AnalysisRecord, SubmissionRecord};
use std::collections::{BTreeMap, HashMap};

/// Corpus-wide statistics, recomputed from scratch on demand. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct AggregateView {
    pub total: usize,
    /// Lowercased sentiment label -> count. Labels absent from the data are
    /// absent from the map; consumers read absence as zero.
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub topic_frequency: Vec<TopicCount>,
    pub word_cloud: Vec<WordWeight>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicCount {
    pub subject: String, // untruncated grouping key
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordWeight {
    pub word: String,
    pub weight: usize,
}

const SUBJECT_DISPLAY_CAP: usize = 20;

/// Compute the aggregate view over the whole corpus. Empty inputs yield
/// empty aggregates.
pub fn aggregate(
    analyses: &[AnalysisRecord],
    submissions: &[SubmissionRecord],
    config: &AnalysisConfig,
) -> AggregateView {
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for analysis in analyses {
        *distribution
            .entry(analysis.sentiment.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut topics = OrderedCounter::new();
    for submission in submissions {
        topics.add(&submission.subject, 1);
    }
    let topic_frequency = topics
        .into_sorted()
        .into_iter()
        .take(config.topic_limit)
        .map(|(subject, count)| TopicCount { subject, count })
        .collect();

    let mut words = OrderedCounter::new();
    for analysis in analyses {
        for token in normalize_tokens(&analysis.summary) {
            if token.chars().count() > 3 {
                words.add(&token, 1);
            }
        }
        for keyword in &analysis.keywords {
            words.add(&keyword.to_lowercase(), config.keyword_weight);
        }
    }
    let word_cloud = words
        .into_sorted()
        .into_iter()
        .take(config.cloud_limit)
        .map(|(word, weight)| WordWeight { word, weight })
        .collect();

    AggregateView {
        total: analyses.len(),
        sentiment_distribution: distribution,
        topic_frequency,
        word_cloud,
    }
}

/// Truncate a subject for table display. Presentation only: aggregation
/// always groups on the full subject.
pub fn display_subject(subject: &str) -> String {
    if subject.chars().count() <= SUBJECT_DISPLAY_CAP {
        return subject.to_string();
    }
    let mut shortened: String = subject.chars().take(SUBJECT_DISPLAY_CAP).collect();
    shortened.push_str("...");
    shortened
}

/// Weighted counter that remembers first-encounter order so that equal
/// weights sort stably against the corpus's input order.
struct OrderedCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl OrderedCounter {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: &str, weight: usize) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += weight,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), weight));
            }
        }
    }

    fn into_sorted(self) -> Vec<(String, usize)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Sentiment;

    fn analysis(summary: &str, sentiment: Sentiment, keywords: &[&str]) -> AnalysisRecord {
        AnalysisRecord {
            id: format!("a-{summary}"),
            submission_id: "s-1".to_string(),
            full_comment: summary.to_string(),
            summary: summary.to_string(),
            sentiment,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn submission(subject: &str) -> SubmissionRecord {
        SubmissionRecord::new(
            "Asha",
            "asha@example.com",
            "Pune",
            "Maharashtra",
            subject,
            "comment",
        )
    }

    #[test]
    fn empty_inputs_yield_empty_view() {
        let view = aggregate(&[], &[], &AnalysisConfig::default());
        assert_eq!(view.total, 0);
        assert!(view.sentiment_distribution.is_empty());
        assert!(view.topic_frequency.is_empty());
        assert!(view.word_cloud.is_empty());
    }

    #[test]
    fn distribution_counts_sum_to_record_count() {
        let analyses = vec![
            analysis("one", Sentiment::Positive, &["alpha"]),
            analysis("two", Sentiment::Positive, &["alpha"]),
            analysis("three", Sentiment::Negative, &["alpha"]),
            analysis("four", Sentiment::Unknown, &["error"]),
        ];
        let view = aggregate(&analyses, &[], &AnalysisConfig::default());
        assert_eq!(view.total, 4);
        let sum: usize = view.sentiment_distribution.values().sum();
        assert_eq!(sum, analyses.len());
        assert_eq!(view.sentiment_distribution.get("positive"), Some(&2));
        assert_eq!(view.sentiment_distribution.get("negative"), Some(&1));
        assert_eq!(view.sentiment_distribution.get("unknown"), Some(&1));
        // absent from the data, absent from the map
        assert_eq!(view.sentiment_distribution.get("neutral"), None);
    }

    #[test]
    fn topics_rank_by_count_with_stable_ties() {
        let submissions = vec![
            submission("Water Supply"),
            submission("Roads"),
            submission("Roads"),
            submission("Street Lights"),
            submission("Water Supply"),
        ];
        let view = aggregate(&[], &submissions, &AnalysisConfig::default());
        // Water Supply and Roads tie at 2; Water Supply was seen first.
        assert_eq!(view.topic_frequency[0].subject, "Water Supply");
        assert_eq!(view.topic_frequency[0].count, 2);
        assert_eq!(view.topic_frequency[1].subject, "Roads");
        assert_eq!(view.topic_frequency[2].subject, "Street Lights");
        assert_eq!(view.topic_frequency[2].count, 1);
    }

    #[test]
    fn topics_truncate_to_limit() {
        let submissions: Vec<SubmissionRecord> =
            (0..15).map(|i| submission(&format!("Subject {i}"))).collect();
        let view = aggregate(&[], &submissions, &AnalysisConfig::default());
        assert_eq!(view.topic_frequency.len(), 10);
    }

    #[test]
    fn topics_group_on_untruncated_subject() {
        let submissions = vec![
            submission("Public Transportation North Corridor"),
            submission("Public Transportation South Corridor"),
        ];
        let view = aggregate(&[], &submissions, &AnalysisConfig::default());
        assert_eq!(view.topic_frequency.len(), 2);
        assert!(view.topic_frequency.iter().all(|t| t.count == 1));
    }

    #[test]
    fn keywords_outweigh_summary_tokens() {
        // "policy" appears once, only as a keyword (weight 3); "good" appears
        // twice, only in summaries (weight 2).
        let analyses = vec![
            analysis("good service overall", Sentiment::Positive, &["policy"]),
            analysis("good staff", Sentiment::Positive, &["transport"]),
        ];
        let view = aggregate(&analyses, &[], &AnalysisConfig::default());
        let policy = view.word_cloud.iter().position(|w| w.word == "policy");
        let good = view.word_cloud.iter().position(|w| w.word == "good");
        assert!(policy.unwrap() < good.unwrap());
        assert_eq!(view.word_cloud[policy.unwrap()].weight, 3);
        assert_eq!(view.word_cloud[good.unwrap()].weight, 2);
    }

    #[test]
    fn cloud_skips_short_summary_tokens_and_normalizes_keyword_case() {
        let analyses = vec![analysis("bus was late", Sentiment::Negative, &["Transport"])];
        let view = aggregate(&analyses, &[], &AnalysisConfig::default());
        // "bus" and "was" are <= 3 chars; "late" survives; keyword lowercased
        assert!(view.word_cloud.iter().any(|w| w.word == "transport" && w.weight == 3));
        assert!(view.word_cloud.iter().any(|w| w.word == "late" && w.weight == 1));
        assert!(!view.word_cloud.iter().any(|w| w.word == "bus"));
    }

    #[test]
    fn cloud_truncates_to_limit() {
        let words: Vec<String> = (0..60).map(|i| format!("word{i:02}entry")).collect();
        let summary = words.join(" ");
        let analyses = vec![analysis(&summary, Sentiment::Neutral, &["roads"])];
        let view = aggregate(&analyses, &[], &AnalysisConfig::default());
        assert_eq!(view.word_cloud.len(), 50);
        // the weighted keyword wins over the weight-1 summary tokens
        assert_eq!(view.word_cloud[0].word, "roads");
    }

    #[test]
    fn subject_display_truncation_is_presentation_only() {
        assert_eq!(display_subject("Roads"), "Roads");
        assert_eq!(
            display_subject("Public Transportation Reform"),
            "Public Transportatio..."
        );
    }
}
