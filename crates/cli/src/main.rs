use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use pulse_core::aggregate::{aggregate, display_subject};
use pulse_core::analysis::Analyzer;
use pulse_core::db;
use pulse_core::lexicon::Lexicon;
use pulse_core::query::{DateSort, FilterSortSpec, join, query_and_sort};
use pulse_core::schema::{Sentiment, SubmissionRecord};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Citizen feedback analysis CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Analyze one submission and store both records
    Submit {
        #[arg(long, default_value = "pulse.db")]
        db: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        comment: String,
        /// Directory with analysis_config.toml, stopwords.yaml, sentiment_markers.yaml
        #[arg(long)]
        lexicon_dir: Option<PathBuf>,
    },
    /// Print submissions matching the given filters
    List {
        #[arg(long, default_value = "pulse.db")]
        db: String,
        /// Case-insensitive substring match on the summary
        #[arg(long, default_value = "")]
        search: String,
        /// positive | negative | neutral | unknown | all
        #[arg(long, default_value = "all")]
        sentiment: String,
        #[arg(long, default_value = "all")]
        district: String,
        #[arg(long, default_value = "all")]
        state: String,
        /// asc | desc | none
        #[arg(long, default_value = "none")]
        sort: String,
    },
    /// Print the aggregate view of the whole corpus
    Stats {
        #[arg(long, default_value = "pulse.db")]
        db: String,
        #[arg(long)]
        lexicon_dir: Option<PathBuf>,
    },
    /// Write the markdown dashboard report
    Report {
        #[arg(long, default_value = "pulse.db")]
        db: String,
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
        #[arg(long)]
        lexicon_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Submit {
            db,
            name,
            email,
            district,
            state,
            subject,
            comment,
            lexicon_dir,
        } => submit(&db, name, email, district, state, subject, comment, lexicon_dir),
        Commands::List {
            db,
            search,
            sentiment,
            district,
            state,
            sort,
        } => list(&db, search, &sentiment, district, state, &sort),
        Commands::Stats { db, lexicon_dir } => stats(&db, lexicon_dir),
        Commands::Report {
            db,
            out_dir,
            lexicon_dir,
        } => write_report(&db, &out_dir, lexicon_dir),
    }
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let submission_schema = schema_for!(pulse_core::schema::SubmissionRecord);
    let submission_json = serde_json::to_string_pretty(&submission_schema)?;
    fs::write(out_dir.join("SubmissionRecord.schema.json"), submission_json)?;

    let analysis_schema = schema_for!(pulse_core::schema::AnalysisRecord);
    let analysis_json = serde_json::to_string_pretty(&analysis_schema)?;
    fs::write(out_dir.join("AnalysisRecord.schema.json"), analysis_json)?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn submit(
    db_path: &str,
    name: String,
    email: String,
    district: String,
    state: String,
    subject: String,
    comment: String,
    lexicon_dir: Option<PathBuf>,
) -> Result<()> {
    if !is_valid_email(&email) {
        bail!("Invalid email format: {email}");
    }

    let lexicon = load_lexicon(lexicon_dir)?;
    let mut analyzer = Analyzer::new(lexicon);

    let submission = SubmissionRecord::new(name, email, district, state, subject, comment);
    let analysis = analyzer.analyze(&submission);
    log::info!("analyzed submission {} as {}", submission.id, analysis.sentiment);

    let conn = db::open(db_path)?;
    db::insert_submission(&conn, &submission)?;
    db::insert_analysis(&conn, &analysis)?;

    println!("Stored submission {} (analysis {})", submission.id, analysis.id);
    Ok(())
}

fn list(
    db_path: &str,
    search: String,
    sentiment: &str,
    district: String,
    state: String,
    sort: &str,
) -> Result<()> {
    let spec = FilterSortSpec {
        search,
        sentiment: parse_sentiment_filter(sentiment)?,
        district: parse_region_filter(district),
        state: parse_region_filter(state),
        date_sort: parse_date_sort(sort)?,
    };

    let conn = db::open(db_path)?;
    let submissions = db::fetch_submissions(&conn)?;
    let analyses = db::fetch_analyses(&conn)?;

    let joined = join(&analyses, &submissions);
    let matched = query_and_sort(&joined, &spec);

    for record in &matched {
        let region = match &record.submission {
            Some(submission) => format!("{}, {}", submission.district, submission.state),
            None => "unknown region".to_string(),
        };
        println!(
            "{}  [{}]  {}  ({})",
            record.analysis.created_at, record.analysis.sentiment, record.analysis.summary, region
        );
        println!("    keywords: {}", record.analysis.keywords.join(", "));
    }
    println!("Showing {} of {} submissions", matched.len(), joined.len());
    Ok(())
}

fn stats(db_path: &str, lexicon_dir: Option<PathBuf>) -> Result<()> {
    let lexicon = load_lexicon(lexicon_dir)?;
    let conn = db::open(db_path)?;
    let submissions = db::fetch_submissions(&conn)?;
    let analyses = db::fetch_analyses(&conn)?;

    let view = aggregate(&analyses, &submissions, &lexicon.config);

    println!("Total submissions: {}", view.total);
    println!("Sentiment distribution:");
    for (label, count) in &view.sentiment_distribution {
        println!("  {label}: {count}");
    }
    println!("Most active subjects:");
    for topic in &view.topic_frequency {
        println!("  {} ({})", display_subject(&topic.subject), topic.count);
    }
    println!("Top keywords:");
    for entry in view.word_cloud.iter().take(10) {
        println!("  {} ({})", entry.word, entry.weight);
    }
    Ok(())
}

fn write_report(db_path: &str, out_dir: &Path, lexicon_dir: Option<PathBuf>) -> Result<()> {
    let lexicon = load_lexicon(lexicon_dir)?;
    let conn = db::open(db_path)?;
    report::build_report(&conn, out_dir, &lexicon.config)?;
    println!("Wrote report to {}", out_dir.display());
    Ok(())
}

fn load_lexicon(lexicon_dir: Option<PathBuf>) -> Result<Lexicon> {
    match lexicon_dir {
        Some(dir) => Lexicon::load_from_dir(&dir),
        None => Ok(Lexicon::default()),
    }
}

fn parse_sentiment_filter(value: &str) -> Result<Option<Sentiment>> {
    match value.to_ascii_lowercase().as_str() {
        "all" => Ok(None),
        "positive" | "negative" | "neutral" | "unknown" => Ok(Some(Sentiment::parse(value))),
        other => bail!("Unknown sentiment filter: {other}"),
    }
}

fn parse_region_filter(value: String) -> Option<String> {
    if value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}

fn parse_date_sort(value: &str) -> Result<DateSort> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(DateSort::Ascending),
        "desc" => Ok(DateSort::Descending),
        "none" => Ok(DateSort::Unsorted),
        other => bail!("Unknown sort direction: {other}"),
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return false;
    }
    !email.contains(char::is_whitespace)
}
