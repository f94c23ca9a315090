//! Saved analyses in a local SQLite database.
//!
//! - Default location `<data_dir>/relate/history.db`, overridable with `RELATE_DB`.
//! - WAL mode; schema created on open.
//! - Records are keyed by insertion time and listed newest first.

pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{AnalysisRecord, AnalysisResult};

const DB_FILENAME: &str = "history.db";

const SELECT_COLUMNS: &str = "id, created_at_ms, person_a, person_b, health_score, summary, \
     communication_style, red_flags_json, action_plan_json, positive_aspects_json, \
     dominant_emotions_json, person_a_percentage, person_b_percentage";

/// Resolve the history DB path: `RELATE_DB`, else the platform data dir.
pub fn default_db_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("RELATE_DB") {
        return Ok(PathBuf::from(path));
    }
    let data_dir = dirs::data_dir().context("could not determine the user data directory")?;
    Ok(data_dir.join("relate").join(DB_FILENAME))
}

/// History of saved analyses
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the DB at `path`. Creates parent dirs, enables WAL, runs migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create history dir {:?}", parent))?;
        }
        let conn = Connection::open(path).with_context(|| format!("open {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        schema::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store (nothing survives the process)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory history")?;
        schema::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Save a result, stamped with the current time. Returns the new row ID.
    pub fn insert(&self, result: &AnalysisResult) -> Result<i64> {
        self.insert_at(result, chrono::Utc::now().timestamp_millis())
    }

    fn insert_at(&self, result: &AnalysisResult, created_at_ms: i64) -> Result<i64> {
        let balance = &result.message_balance;
        self.conn
            .execute(
                "INSERT INTO analysis_history (created_at_ms, person_a, person_b, health_score, \
                 summary, communication_style, red_flags_json, action_plan_json, \
                 positive_aspects_json, dominant_emotions_json, person_a_percentage, \
                 person_b_percentage) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    created_at_ms,
                    balance.person_a,
                    balance.person_b,
                    result.health_score,
                    result.summary,
                    result.communication_style,
                    serde_json::to_string(&result.red_flags)?,
                    serde_json::to_string(&result.action_plan)?,
                    serde_json::to_string(&result.positive_aspects)?,
                    serde_json::to_string(&result.dominant_emotions)?,
                    balance.person_a_percentage,
                    balance.person_b_percentage,
                ],
            )
            .context("insert analysis record")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All records, newest first
    pub fn list(&self) -> Result<Vec<AnalysisRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM analysis_history ORDER BY created_at_ms DESC, id DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], record_from_row)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn get(&self, id: i64) -> Result<Option<AnalysisRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM analysis_history WHERE id = ?1", SELECT_COLUMNS),
                [id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM analysis_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete one record. Returns false if it didn't exist.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM analysis_history WHERE id = ?1", [id])?;
        Ok(n > 0)
    }

    /// Delete every record. Returns how many were removed.
    pub fn delete_all(&self) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM analysis_history", [])?;
        Ok(n)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        id: row.get(0)?,
        created_at_ms: row.get(1)?,
        person_a: row.get(2)?,
        person_b: row.get(3)?,
        health_score: row.get(4)?,
        summary: row.get(5)?,
        communication_style: row.get(6)?,
        red_flags: json_list(row, 7)?,
        action_plan: json_list(row, 8)?,
        positive_aspects: json_list(row, 9)?,
        dominant_emotions: json_list(row, 10)?,
        person_a_percentage: row.get(11)?,
        person_b_percentage: row.get(12)?,
    })
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
