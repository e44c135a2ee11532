//! SQLite-backed persistence.
//!
//! Every document is stored as JSON text in a single key-value table, so the schema
//! of the documents themselves is versioned by the documents, not by SQL migrations.

use super::store::PersistenceStore;
use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_database(&conn)?;
        Ok(Self { conn })
    }
}

/// Creates the key-value table if needed.
fn init_database(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )?;
    Ok(())
}

impl PersistenceStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Json {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let text = value.to_string();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}
