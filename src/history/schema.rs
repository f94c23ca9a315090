//! SQL schema for the history DB. Applied on open.

/// One row per saved analysis. List columns hold JSON arrays of strings.
pub const ANALYSIS_HISTORY: &str = "
CREATE TABLE IF NOT EXISTS analysis_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at_ms INTEGER NOT NULL,
    person_a TEXT NOT NULL DEFAULT '',
    person_b TEXT NOT NULL DEFAULT '',
    health_score INTEGER NOT NULL DEFAULT 0,
    summary TEXT NOT NULL DEFAULT '',
    communication_style TEXT NOT NULL DEFAULT '',
    red_flags_json TEXT NOT NULL DEFAULT '[]',
    action_plan_json TEXT NOT NULL DEFAULT '[]',
    positive_aspects_json TEXT NOT NULL DEFAULT '[]',
    dominant_emotions_json TEXT NOT NULL DEFAULT '[]',
    person_a_percentage INTEGER NOT NULL DEFAULT 50,
    person_b_percentage INTEGER NOT NULL DEFAULT 50
);
CREATE INDEX IF NOT EXISTS idx_analysis_history_created ON analysis_history(created_at_ms);
";

/// Run all migrations on an open connection.
pub fn run_all(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute_batch(ANALYSIS_HISTORY)?;
    Ok(())
}
