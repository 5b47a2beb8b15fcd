//! Tables of a role's `engrams.db`.
//!
//! `engrams` keeps scalar columns for ad-hoc inspection next to the JSON the
//! store reloads from; `engram_cues` mirrors the in-memory inverted index.

use rusqlite::Connection;

/// Schema DDL at version 1. Later columns arrive through migrations.
const SCHEMA_SQL: &str = r#"
-- One row per engram; `engram` holds the full serialized unit
CREATE TABLE IF NOT EXISTS engrams (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    type TEXT NOT NULL CHECK(type IN ('ATOMIC','LINK','PATTERN')),
    timestamp TEXT NOT NULL,
    strength REAL NOT NULL CHECK(strength >= 0.0 AND strength <= 1.0),
    cues TEXT NOT NULL,
    engram TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_engrams_type ON engrams(type);
CREATE INDEX IF NOT EXISTS idx_engrams_timestamp ON engrams(timestamp);

-- Inverted cue index
CREATE TABLE IF NOT EXISTS engram_cues (
    engram_id TEXT NOT NULL REFERENCES engrams(id) ON DELETE CASCADE,
    cue TEXT NOT NULL,
    PRIMARY KEY (engram_id, cue)
);

CREATE INDEX IF NOT EXISTS idx_engram_cues_cue ON engram_cues(cue);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Create the version-1 tables on an empty file; existing files are untouched.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;
    Ok(())
}
