//! SQLite implementation of [`EngramBackend`].
//!
//! Each record is written as one `engrams` row (scalar columns for inspection,
//! plus `cues` and `engram` as JSON for reconstruction) and one `engram_cues`
//! row per cue. An upsert of a batch runs in a single transaction, so a reader
//! of the file never sees a record without its cues.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::memory::error::PersistenceError;
use crate::memory::store::{EngramBackend, StoredEngram};
use crate::memory::types::Engram;

pub struct SqliteBackend {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let conn = super::open_database(path).map_err(|e| PersistenceError::Open {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-initialized connection (used with in-memory databases).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn, path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl EngramBackend for SqliteBackend {
    fn load(&mut self) -> Result<Vec<StoredEngram>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, engram, cues, access_count, last_accessed FROM engrams")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, engram_json, cues_json, access_count, last_accessed) in rows {
            match decode(&engram_json, &cues_json) {
                Ok((engram, cues)) => records.push(StoredEngram {
                    engram,
                    cues,
                    access_count,
                    last_accessed: last_accessed.as_deref().and_then(parse_time),
                }),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "skipping undecodable engram record");
                }
            }
        }
        tracing::debug!(path = ?self.path(), engrams = records.len(), "engram records loaded");
        Ok(records)
    }

    fn upsert(&mut self, records: &[&StoredEngram]) -> Result<(), PersistenceError> {
        if records.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        for record in records {
            let engram = &record.engram;
            let cues_json = serde_json::to_string(&record.cues)?;
            let engram_json = serde_json::to_string(engram)?;

            tx.execute(
                "INSERT INTO engrams (id, content, type, timestamp, strength, cues, engram, access_count, last_accessed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 ON CONFLICT(id) DO UPDATE SET \
                    content = excluded.content, \
                    type = excluded.type, \
                    timestamp = excluded.timestamp, \
                    strength = excluded.strength, \
                    cues = excluded.cues, \
                    engram = excluded.engram, \
                    access_count = excluded.access_count, \
                    last_accessed = excluded.last_accessed",
                params![
                    engram.id,
                    engram.content,
                    engram.engram_type.as_str(),
                    format_time(&engram.timestamp),
                    engram.strength,
                    cues_json,
                    engram_json,
                    record.access_count,
                    record.last_accessed.as_ref().map(format_time),
                ],
            )?;

            tx.execute(
                "DELETE FROM engram_cues WHERE engram_id = ?1",
                params![engram.id],
            )?;
            let mut insert_cue =
                tx.prepare_cached("INSERT INTO engram_cues (engram_id, cue) VALUES (?1, ?2)")?;
            for cue in &record.cues {
                insert_cue.execute(params![engram.id, cue])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn touch(&mut self, records: &[&StoredEngram]) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "UPDATE engrams SET access_count = ?1, last_accessed = ?2 WHERE id = ?3",
            )?;
            for record in records {
                stmt.execute(params![
                    record.access_count,
                    record.last_accessed.as_ref().map(format_time),
                    record.engram.id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn decode(engram_json: &str, cues_json: &str) -> Result<(Engram, BTreeSet<String>), PersistenceError> {
    let engram: Engram = serde_json::from_str(engram_json)?;
    let cues: BTreeSet<String> = serde_json::from_str(cues_json)?;
    Ok((engram, cues))
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
