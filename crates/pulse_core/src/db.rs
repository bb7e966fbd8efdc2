use crate::schema::{AnalysisRecord, Sentiment, SubmissionRecord};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    log::debug!("opened database at {db_path}");
    Ok(conn)
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          email TEXT NOT NULL,
          district TEXT NOT NULL,
          state TEXT NOT NULL,
          subject TEXT NOT NULL,
          comment TEXT NOT NULL,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS analyses (
          id TEXT PRIMARY KEY,
          submission_id TEXT NOT NULL REFERENCES submissions(id),
          full_comment TEXT NOT NULL,
          summary TEXT NOT NULL,
          sentiment TEXT NOT NULL,
          keywords_json TEXT NOT NULL,
          created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_submissions_created_at ON submissions(created_at);
        CREATE INDEX IF NOT EXISTS idx_analyses_created_at ON analyses(created_at);
        "#,
    )?;
    Ok(())
}

pub fn insert_submission(conn: &Connection, submission: &SubmissionRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO submissions (id, name, email, district, state, subject, comment, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            submission.id,
            submission.name,
            submission.email,
            submission.district,
            submission.state,
            submission.subject,
            submission.comment,
            submission.created_at,
        ],
    )?;
    Ok(())
}

pub fn insert_analysis(conn: &Connection, analysis: &AnalysisRecord) -> Result<()> {
    let keywords_json = serde_json::to_string(&analysis.keywords)?;
    conn.execute(
        r#"
        INSERT INTO analyses (
          id, submission_id, full_comment, summary, sentiment, keywords_json, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
          submission_id=excluded.submission_id,
          full_comment=excluded.full_comment,
          summary=excluded.summary,
          sentiment=excluded.sentiment,
          keywords_json=excluded.keywords_json,
          created_at=excluded.created_at
        "#,
        params![
            analysis.id,
            analysis.submission_id,
            analysis.full_comment,
            analysis.summary,
            analysis.sentiment.as_str(),
            keywords_json,
            analysis.created_at,
        ],
    )?;
    Ok(())
}

/// All submissions, newest first. This is the retrieval order the query
/// layer treats as "unsorted".
pub fn fetch_submissions(conn: &Connection) -> Result<Vec<SubmissionRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, email, district, state, subject, comment, created_at
        FROM submissions
        ORDER BY created_at DESC
        "#,
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(SubmissionRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            district: row.get(3)?,
            state: row.get(4)?,
            subject: row.get(5)?,
            comment: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;

    let mut submissions = Vec::new();
    for row in rows {
        submissions.push(row?);
    }
    log::debug!("fetched {} submissions", submissions.len());
    Ok(submissions)
}

/// All analyses, newest first.
pub fn fetch_analyses(conn: &Connection) -> Result<Vec<AnalysisRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, submission_id, full_comment, summary, sentiment, keywords_json, created_at
        FROM analyses
        ORDER BY created_at DESC
        "#,
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(AnalysisRow {
            id: row.get(0)?,
            submission_id: row.get(1)?,
            full_comment: row.get(2)?,
            summary: row.get(3)?,
            sentiment: row.get(4)?,
            keywords_json: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;

    let mut analyses = Vec::new();
    for row in rows {
        let r = row?;
        let keywords: Vec<String> = serde_json::from_str(&r.keywords_json)?;
        analyses.push(AnalysisRecord {
            id: r.id,
            submission_id: r.submission_id,
            full_comment: r.full_comment,
            summary: r.summary,
            sentiment: Sentiment::parse(&r.sentiment),
            keywords,
            created_at: r.created_at,
        });
    }
    log::debug!("fetched {} analyses", analyses.len());
    Ok(analyses)
}

#[derive(Debug)]
struct AnalysisRow {
    id: String,
    submission_id: String,
    full_comment: String,
    summary: String,
    sentiment: String,
    keywords_json: String,
    created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::lexicon::Lexicon;

    fn open_in_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();
        conn
    }

    fn stored_submission(conn: &Connection, comment: &str, created_at: &str) -> SubmissionRecord {
        let mut submission = SubmissionRecord::new(
            "Asha",
            "asha@example.com",
            "Pune",
            "Maharashtra",
            "Roads",
            comment,
        );
        submission.created_at = created_at.to_string();
        insert_submission(conn, &submission).unwrap();
        submission
    }

    #[test]
    fn round_trips_submission_and_analysis() {
        let conn = open_in_memory();
        let submission = stored_submission(&conn, "The park is excellent.", "2026-02-01T10:00:00Z");

        let mut analyzer = Analyzer::new(Lexicon::default());
        let analysis = analyzer.analyze(&submission);
        insert_analysis(&conn, &analysis).unwrap();

        let submissions = fetch_submissions(&conn).unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].comment, submission.comment);

        let analyses = fetch_analyses(&conn).unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].submission_id, submission.id);
        assert_eq!(analyses[0].sentiment, analysis.sentiment);
        assert_eq!(analyses[0].keywords, analysis.keywords);
    }

    #[test]
    fn fetches_are_newest_first() {
        let conn = open_in_memory();
        stored_submission(&conn, "older", "2026-02-01T10:00:00Z");
        stored_submission(&conn, "newer", "2026-02-02T10:00:00Z");

        let submissions = fetch_submissions(&conn).unwrap();
        assert_eq!(submissions[0].comment, "newer");
        assert_eq!(submissions[1].comment, "older");
    }

    #[test]
    fn analysis_insert_is_an_upsert() {
        let conn = open_in_memory();
        let submission = stored_submission(&conn, "bad drainage", "2026-02-01T10:00:00Z");

        let mut analyzer = Analyzer::new(Lexicon::default());
        let mut analysis = analyzer.analyze(&submission);
        insert_analysis(&conn, &analysis).unwrap();

        analysis.summary = "revised".to_string();
        insert_analysis(&conn, &analysis).unwrap();

        let analyses = fetch_analyses(&conn).unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].summary, "revised");
    }
}
