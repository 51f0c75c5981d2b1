use anyhow::{Context, Result};
use rusqlite::Connection;

/// DDL for the only table. `created_at` is filled by SQLite on insert and is
/// already in RFC 3339 form.
const NOTES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
    )";

pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let existed = notes_table_exists(conn)?;

    conn.execute_batch(NOTES_TABLE)
        .context("Failed to create notes table")?;

    if !existed {
        tracing::info!("Created notes table");
    }

    Ok(())
}

fn notes_table_exists(conn: &Connection) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='notes'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_created_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        assert!(notes_table_exists(&conn).unwrap());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO notes (title, content) VALUES ('a', 'b')", [])
            .unwrap();

        ensure_schema(&conn).unwrap();

        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_created_at_defaults_to_rfc3339() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO notes (title, content) VALUES ('a', 'b')", [])
            .unwrap();

        let created_at: String = conn
            .query_row("SELECT created_at FROM notes", [], |row| row.get(0))
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&created_at).is_ok());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO notes (title) VALUES ('a')", []).unwrap();
        let first = conn.last_insert_rowid();
        conn.execute("DELETE FROM notes", []).unwrap();
        conn.execute("INSERT INTO notes (title) VALUES ('b')", []).unwrap();

        assert!(conn.last_insert_rowid() > first);
    }
}
