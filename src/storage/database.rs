//! SQLite database management

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::storage::models::{ShareRecord, Summary, Transcript};
use crate::storage::store::SummaryStore;

/// Database wrapper for recap
pub struct Database {
    conn: Mutex<Connection>,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

const SUMMARY_COLUMNS: &str =
    "id, transcript_id, structured, editable_text, generated_text, created_at, updated_at";

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database; contents are lost when it is dropped
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let current_version = schema_version(&conn)?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            migrate_to_v1(&conn)?;
            conn.execute("PRAGMA user_version = 1", [])?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.conn()?;
        schema_version(&conn)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };

        Ok(DatabaseStats {
            total_transcripts: count("transcripts")?,
            total_summaries: count("summaries")?,
            total_shares: count("shares")?,
        })
    }

    /// Resolve a transcript ID prefix to a full ID
    pub fn find_transcript_id(&self, prefix: &str) -> Result<Option<String>> {
        self.find_id_by_prefix("transcripts", prefix)
    }

    /// Resolve a summary ID prefix to a full ID
    pub fn find_summary_id(&self, prefix: &str) -> Result<Option<String>> {
        self.find_id_by_prefix("summaries", prefix)
    }

    fn find_id_by_prefix(&self, table: &str, prefix: &str) -> Result<Option<String>> {
        if prefix.is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {} WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2",
            table
        ))?;
        let ids = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(id.clone())),
            _ => anyhow::bail!("ID prefix '{}' matches more than one entry", prefix),
        }
    }
}

fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

fn migrate_to_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS transcripts (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS summaries (
            id TEXT PRIMARY KEY,
            transcript_id TEXT NOT NULL,
            structured TEXT NOT NULL DEFAULT '{}',
            editable_text TEXT NOT NULL,
            generated_text TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (transcript_id) REFERENCES transcripts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_summaries_transcript_id
            ON summaries(transcript_id);
        CREATE INDEX IF NOT EXISTS idx_summaries_created_at
            ON summaries(created_at DESC);

        CREATE TABLE IF NOT EXISTS shares (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            summary_id TEXT NOT NULL,
            recipients TEXT NOT NULL DEFAULT '[]',
            delivered INTEGER NOT NULL,
            detail TEXT,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (summary_id) REFERENCES summaries(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_shares_summary_id
            ON shares(summary_id);
        "#,
    )?;

    Ok(())
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: row.get(0)?,
        transcript_id: row.get(1)?,
        structured: json_column(row, 2)?,
        editable_text: row.get(3)?,
        generated_text: row.get(4)?,
        created_at: timestamp(row.get(5)?),
        updated_at: timestamp(row.get(6)?),
    })
}

impl SummaryStore for Database {
    fn put_transcript(&self, transcript: &Transcript) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO transcripts (id, text, created_at) VALUES (?1, ?2, ?3)",
            params![
                transcript.id,
                transcript.text,
                transcript.created_at.timestamp()
            ],
        )?;
        Ok(())
    }

    fn get_transcript(&self, id: &str) -> Result<Option<Transcript>> {
        let transcript = self
            .conn()?
            .query_row(
                "SELECT id, text, created_at FROM transcripts WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Transcript {
                        id: row.get(0)?,
                        text: row.get(1)?,
                        created_at: timestamp(row.get(2)?),
                    })
                },
            )
            .optional()?;
        Ok(transcript)
    }

    fn put_summary(&self, summary: &Summary) -> Result<()> {
        let structured = serde_json::to_string(&summary.structured)?;

        self.conn()?.execute(
            r#"
            INSERT INTO summaries (id, transcript_id, structured, editable_text, generated_text, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                summary.id,
                summary.transcript_id,
                structured,
                summary.editable_text,
                summary.generated_text,
                summary.created_at.timestamp(),
                summary.updated_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    fn get_summary(&self, id: &str) -> Result<Option<Summary>> {
        let summary = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM summaries WHERE id = ?1", SUMMARY_COLUMNS),
                params![id],
                row_to_summary,
            )
            .optional()?;
        Ok(summary)
    }

    fn update_summary_text(&self, id: &str, edited_text: &str) -> Result<bool> {
        let changed = self.conn()?.execute(
            "UPDATE summaries SET editable_text = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, edited_text, Utc::now().timestamp()],
        )?;
        Ok(changed > 0)
    }

    fn list_summaries(&self, limit: usize) -> Result<Vec<Summary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM summaries ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            SUMMARY_COLUMNS
        ))?;

        let summaries = stmt
            .query_map(params![limit], row_to_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(summaries)
    }

    fn record_share(&self, share: &ShareRecord) -> Result<i64> {
        let recipients = serde_json::to_string(&share.recipients)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO shares (summary_id, recipients, delivered, detail, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                share.summary_id,
                recipients,
                share.delivered,
                share.detail,
                share.created_at.timestamp(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn list_shares(&self, summary_id: &str) -> Result<Vec<ShareRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, summary_id, recipients, delivered, detail, created_at
             FROM shares
             WHERE summary_id = ?1
             ORDER BY id",
        )?;

        let shares = stmt
            .query_map(params![summary_id], |row| {
                Ok(ShareRecord {
                    id: row.get(0)?,
                    summary_id: row.get(1)?,
                    recipients: json_column(row, 2)?,
                    delivered: row.get(3)?,
                    detail: row.get(4)?,
                    created_at: timestamp(row.get(5)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(shares)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_transcripts: usize,
    pub total_summaries: usize,
    pub total_shares: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn seeded() -> (Database, Transcript, Summary) {
        let db = Database::open_memory().unwrap();
        let transcript = Transcript::new("Discuss budget. Assign owner.".to_string());
        db.put_transcript(&transcript).unwrap();

        let summary = Summary::new(
            transcript.id.clone(),
            json!({"agenda": ["budget"]}),
            "# Summary".to_string(),
        );
        db.put_summary(&summary).unwrap();
        (db, transcript, summary)
    }

    #[test]
    fn test_create_database() {
        let db = Database::open_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_transcripts, 0);
        assert_eq!(stats.total_summaries, 0);
    }

    #[test]
    fn test_new_database_sets_schema_version() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_summary_round_trip_keeps_structured_json() {
        let (db, transcript, summary) = seeded();

        let stored = db.get_summary(&summary.id).unwrap().unwrap();
        assert_eq!(stored.transcript_id, transcript.id);
        assert_eq!(stored.structured, json!({"agenda": ["budget"]}));
        assert_eq!(stored.editable_text, "# Summary");
        assert!(!stored.is_edited());
    }

    #[test]
    fn test_update_summary_text_keeps_generated_text() {
        let (db, _, summary) = seeded();

        assert!(db.update_summary_text(&summary.id, "# Edited").unwrap());
        let stored = db.get_summary(&summary.id).unwrap().unwrap();
        assert_eq!(stored.editable_text, "# Edited");
        assert_eq!(stored.generated_text, "# Summary");
        assert!(stored.is_edited());
    }

    #[test]
    fn test_update_missing_summary_reports_false() {
        let db = Database::open_memory().unwrap();
        assert!(!db.update_summary_text("missing", "text").unwrap());
        assert!(db.get_summary("missing").unwrap().is_none());
    }

    #[test]
    fn test_summary_requires_existing_transcript() {
        let db = Database::open_memory().unwrap();
        let orphan = Summary::new("nope".to_string(), json!({}), "text".to_string());
        assert!(db.put_summary(&orphan).is_err());
    }

    #[test]
    fn test_shares_are_listed_in_order() {
        let (db, _, summary) = seeded();

        db.record_share(&ShareRecord::delivered(
            summary.id.clone(),
            vec!["a@example.com".to_string()],
        ))
        .unwrap();
        db.record_share(&ShareRecord::failed(
            summary.id.clone(),
            vec!["b@example.com".to_string()],
            "relay refused".to_string(),
        ))
        .unwrap();

        let shares = db.list_shares(&summary.id).unwrap();
        assert_eq!(shares.len(), 2);
        assert!(shares[0].delivered);
        assert_eq!(shares[1].recipients, vec!["b@example.com".to_string()]);
        assert_eq!(shares[1].detail.as_deref(), Some("relay refused"));
        assert_eq!(db.get_stats().unwrap().total_shares, 2);
    }

    #[test]
    fn test_reopening_file_database_keeps_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("recap.db");

        let transcript = Transcript::new("persisted".to_string());
        {
            let db = Database::open_path(&path).unwrap();
            db.put_transcript(&transcript).unwrap();
        }

        let db = Database::open_path(&path).unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
        let stored = db.get_transcript(&transcript.id).unwrap().unwrap();
        assert_eq!(stored.text, "persisted");
    }

    #[test]
    fn test_find_ids_by_prefix() {
        let (db, transcript, summary) = seeded();

        assert_eq!(
            db.find_summary_id(&summary.id[..8]).unwrap(),
            Some(summary.id.clone())
        );
        assert_eq!(
            db.find_transcript_id(&transcript.id).unwrap(),
            Some(transcript.id.clone())
        );
        assert_eq!(db.find_summary_id("zzzz").unwrap(), None);
        assert_eq!(db.find_summary_id("").unwrap(), None);
    }

    #[test]
    fn test_ambiguous_prefix_is_an_error() {
        let db = Database::open_memory().unwrap();
        for id in ["abc-1", "abc-2"] {
            let mut transcript = Transcript::new("text".to_string());
            transcript.id = id.to_string();
            db.put_transcript(&transcript).unwrap();
        }

        assert!(db.find_transcript_id("abc").is_err());
        assert_eq!(
            db.find_transcript_id("abc-2").unwrap(),
            Some("abc-2".to_string())
        );
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("future.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute("PRAGMA user_version = 7", []).unwrap();
        drop(conn);

        let err = match Database::open_path(&path) {
            Ok(_) => panic!("expected newer schema to be rejected"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("newer than supported"));
    }
}
