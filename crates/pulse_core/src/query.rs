use crate::schema::{AnalysisRecord, Sentiment, SubmissionRecord};
use std::collections::HashMap;

/// One analysis paired with its submission. The submission side is optional:
/// an analysis whose foreign key matches nothing still appears in the list,
/// it just cannot satisfy region filters.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub analysis: AnalysisRecord,
    pub submission: Option<SubmissionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSort {
    Ascending,
    Descending,
    /// Preserve input order, which is newest-first from the upstream fetch.
    Unsorted,
}

/// Per-query filter and sort parameters. `None` filters mean "all".
#[derive(Debug, Clone)]
pub struct FilterSortSpec {
    pub search: String,
    pub sentiment: Option<Sentiment>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub date_sort: DateSort,
}

impl Default for FilterSortSpec {
    fn default() -> Self {
        Self {
            search: String::new(),
            sentiment: None,
            district: None,
            state: None,
            date_sort: DateSort::Unsorted,
        }
    }
}

/// Pair each analysis with its submission by `submission_id`, preserving the
/// analyses' input order.
pub fn join(
    analyses: &[AnalysisRecord],
    submissions: &[SubmissionRecord],
) -> Vec<JoinedRecord> {
    let by_id: HashMap<&str, &SubmissionRecord> = submissions
        .iter()
        .map(|submission| (submission.id.as_str(), submission))
        .collect();

    analyses
        .iter()
        .map(|analysis| JoinedRecord {
            analysis: analysis.clone(),
            submission: by_id
                .get(analysis.submission_id.as_str())
                .map(|submission| (*submission).clone()),
        })
        .collect()
}

/// Apply the AND-composed filters, then the requested date sort. The sort is
/// stable: records with equal timestamps keep their relative input order in
/// both directions.
pub fn query_and_sort(joined: &[JoinedRecord], spec: &FilterSortSpec) -> Vec<JoinedRecord> {
    let mut matched: Vec<JoinedRecord> = joined
        .iter()
        .filter(|record| matches(record, spec))
        .cloned()
        .collect();

    match spec.date_sort {
        DateSort::Ascending => {
            matched.sort_by(|a, b| a.analysis.created_at.cmp(&b.analysis.created_at));
        }
        DateSort::Descending => {
            matched.sort_by(|a, b| b.analysis.created_at.cmp(&a.analysis.created_at));
        }
        DateSort::Unsorted => {}
    }
    matched
}

fn matches(record: &JoinedRecord, spec: &FilterSortSpec) -> bool {
    if !spec.search.is_empty() {
        let summary = record.analysis.summary.to_lowercase();
        if !summary.contains(&spec.search.to_lowercase()) {
            return false;
        }
    }

    if let Some(sentiment) = spec.sentiment {
        if record.analysis.sentiment != sentiment {
            return false;
        }
    }

    if let Some(district) = &spec.district {
        match &record.submission {
            Some(submission) if submission.district == *district => {}
            _ => return false,
        }
    }

    if let Some(state) = &spec.state {
        match &record.submission {
            Some(submission) if submission.state == *state => {}
            _ => return false,
        }
    }

    true
}
