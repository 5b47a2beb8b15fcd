//! Forward-only migrations for role databases.
//!
//! `schema_meta.schema_version` records how far a file has been upgraded.
//! Each step in [`MIGRATIONS`] runs together with its version bump in one
//! transaction, so a crash mid-upgrade leaves the file at the previous version.

use rusqlite::{Connection, OptionalExtension};

/// Version a freshly opened database ends up at.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// `(target_version, sql)` in ascending order.
const MIGRATIONS: &[(u32, &str)] = &[(
    2,
    "ALTER TABLE engrams ADD COLUMN access_count INTEGER NOT NULL DEFAULT 0;
     ALTER TABLE engrams ADD COLUMN last_accessed TEXT;",
)];

/// Stored schema version; 0 when the file predates `schema_meta` bookkeeping
/// or holds an unreadable value.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.and_then(|v| v.parse().ok()).unwrap_or(0))
}

/// Apply every migration above the stored version.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let from = get_schema_version(conn)?;
    let pending = MIGRATIONS.iter().filter(|(target, _)| *target > from);

    for (target, sql) in pending {
        tracing::info!(from, to = *target, "migrating engram database");
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_meta (key, value) VALUES ('schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [target.to_string()],
        )?;
        tx.commit()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_schema;

    fn engram_columns(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM pragma_table_info('engrams')")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn last_migration_reaches_current_version() {
        assert_eq!(MIGRATIONS.last().map(|(v, _)| *v), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn v1_file_gains_access_columns() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert!(!engram_columns(&conn).iter().any(|c| c == "access_count"));

        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        let columns = engram_columns(&conn);
        assert!(columns.iter().any(|c| c == "access_count"));
        assert!(columns.iter().any(|c| c == "last_accessed"));
    }

    #[test]
    fn rerunning_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }
}
