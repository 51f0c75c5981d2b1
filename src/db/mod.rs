mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use thiserror::Error;

use crate::models::*;

/// Failures from note storage operations.
///
/// Statement failures (prepare, bind, execute) are kept apart from failures
/// decoding a returned row because the API maps them to different statuses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Statement(#[source] rusqlite::Error),
    #[error("{0}")]
    Row(#[source] rusqlite::Error),
    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Shared handle to the notes database.
///
/// Clones share one connection. The handle is opened once at startup, handed
/// to the router as state, and released with [`Database::close`].
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the `notes` table if it does not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::ensure_schema(&conn)
    }

    /// Close the underlying connection.
    ///
    /// If other clones are still alive the connection stays open and is
    /// closed when the last of them is dropped.
    pub fn close(self) -> Result<()> {
        let mutex = match Arc::try_unwrap(self.conn) {
            Ok(mutex) => mutex,
            Err(_) => {
                tracing::debug!("Database still shared, deferring close");
                return Ok(());
            }
        };

        let conn = mutex
            .into_inner()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        conn.close().map_err(|(_, e)| anyhow::Error::from(e))?;
        tracing::info!("Database closed");
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    // ============================================================
    // Note operations
    // ============================================================

    /// Insert a note and return the id storage assigned to it.
    pub fn create_note(&self, input: &CreateNoteInput) -> StoreResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (title, content) VALUES (?, ?)",
            (&input.title, &input.content),
        )
        .map_err(StoreError::Statement)?;

        Ok(conn.last_insert_rowid())
    }

    /// Set the title column only. Returns the number of rows changed.
    pub fn update_note_title(&self, id: i64, title: &str) -> StoreResult<usize> {
        let conn = self.lock()?;
        conn.execute("UPDATE notes SET title = ? WHERE id = ?", (title, id))
            .map_err(StoreError::Statement)
    }

    /// Set the content column only. Returns the number of rows changed.
    pub fn update_note_content(&self, id: i64, content: &str) -> StoreResult<usize> {
        let conn = self.lock()?;
        conn.execute("UPDATE notes SET content = ? WHERE id = ?", (content, id))
            .map_err(StoreError::Statement)
    }

    /// Hard delete. Deleting a missing id is not an error and returns 0.
    pub fn delete_note(&self, id: i64) -> StoreResult<usize> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM notes WHERE id = ?", [id])
            .map_err(StoreError::Statement)
    }

    pub fn get_note(&self, id: i64) -> StoreResult<Option<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, title, content, created_at FROM notes WHERE id = ?")
            .map_err(StoreError::Statement)?;

        let mut rows = stmt.query([id]).map_err(StoreError::Statement)?;
        let note = match rows.next().map_err(StoreError::Row)? {
            Some(row) => Some(note_from_row(row).map_err(StoreError::Row)?),
            None => None,
        };

        Ok(note)
    }

    /// All notes in whatever order SQLite returns them.
    pub fn get_all_notes(&self) -> StoreResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, title, content, created_at FROM notes")
            .map_err(StoreError::Statement)?;

        let notes = stmt
            .query_map([], note_from_row)
            .map_err(StoreError::Statement)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Row)?;

        Ok(notes)
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "notes-service")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("notes.db"))
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: normalize_timestamp(row.get::<_, String>(3)?),
    })
}

/// Render a stored timestamp as RFC 3339 UTC.
///
/// Rows written by this service are already in that form; rows written with
/// SQLite's `CURRENT_TIMESTAMP` use `YYYY-MM-DD HH:MM:SS`. Anything else is
/// returned untouched.
fn normalize_timestamp(raw: String) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }

    match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => naive
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        Err(_) => raw,
    }
}
