use anyhow::Result;
use pulse_core::aggregate::{AggregateView, aggregate, display_subject};
use pulse_core::db;
use pulse_core::lexicon::AnalysisConfig;
use pulse_core::query::{FilterSortSpec, JoinedRecord, join, query_and_sort};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub struct ReportPaths {
    pub root: PathBuf,
    pub dashboard: PathBuf,
    pub submissions: PathBuf,
}

impl ReportPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            dashboard: root.join("Dashboard.md"),
            submissions: root.join("Submissions.md"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

/// Read the database, recompute the aggregate view and the joined record
/// list, and write the markdown dashboard files.
pub fn build_report(conn: &Connection, report_root: &Path, config: &AnalysisConfig) -> Result<()> {
    let paths = ReportPaths::new(report_root);
    paths.ensure()?;

    let submissions = db::fetch_submissions(conn)?;
    let analyses = db::fetch_analyses(conn)?;

    let view = aggregate(&analyses, &submissions, config);
    let joined = query_and_sort(&join(&analyses, &submissions), &FilterSortSpec::default());

    fs::write(&paths.dashboard, render_dashboard(&view))?;
    fs::write(&paths.submissions, render_submissions(&joined))?;

    log::info!(
        "wrote dashboard for {} submissions to {}",
        view.total,
        paths.root.display()
    );
    Ok(())
}

fn render_dashboard(view: &AggregateView) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Consultation Dashboard".to_string());
    lines.push(String::new());
    lines.push("This report is generated. Do not edit manually.".to_string());
    lines.push(format!("Generated: {}", generated_at()));
    lines.push(String::new());

    lines.push(format!("Total submissions: {}", view.total));
    lines.push(String::new());

    lines.push("## Sentiment Distribution".to_string());
    lines.push(String::new());
    if view.sentiment_distribution.is_empty() {
        lines.push("_No analyses recorded._".to_string());
    } else {
        for (label, count) in &view.sentiment_distribution {
            lines.push(format!(
                "- {label}: {count} ({}% of total)",
                percent(*count, view.total)
            ));
        }
    }
    lines.push(String::new());

    lines.push("## Most Active Subjects".to_string());
    lines.push(String::new());
    if view.topic_frequency.is_empty() {
        lines.push("_No submissions recorded._".to_string());
    } else {
        for topic in &view.topic_frequency {
            lines.push(format!("- {} ({})", display_subject(&topic.subject), topic.count));
        }
    }
    lines.push(String::new());

    lines.push("## Word Cloud".to_string());
    lines.push(String::new());
    if view.word_cloud.is_empty() {
        lines.push("_No keywords recorded._".to_string());
    } else {
        for entry in &view.word_cloud {
            lines.push(format!("- {} ({})", entry.word, entry.weight));
        }
    }
    lines.push(String::new());

    lines.join("\n")
}

fn render_submissions(joined: &[JoinedRecord]) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Submissions".to_string());
    lines.push(String::new());
    lines.push("This report is generated. Do not edit manually.".to_string());
    lines.push(String::new());

    if joined.is_empty() {
        lines.push("_No submissions found._".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    for record in joined {
        let analysis = &record.analysis;
        lines.push(format!(
            "## {} - {}",
            analysis.created_at, analysis.sentiment
        ));
        lines.push(String::new());
        if let Some(submission) = &record.submission {
            lines.push(format!("- Subject: {}", submission.subject));
            lines.push(format!(
                "- Region: {}, {}",
                submission.district, submission.state
            ));
        } else {
            lines.push("- Submission record missing".to_string());
        }
        lines.push(format!("- Summary: {}", analysis.summary));
        lines.push(format!("- Keywords: {}", analysis.keywords.join(", ")));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

fn generated_at() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
