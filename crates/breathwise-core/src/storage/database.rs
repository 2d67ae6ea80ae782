//! SQLite-backed storage.
//!
//! Provides persistent storage for:
//! - Key-value records (reminder list, installed trigger ids)
//! - Triggers installed through the local notification platform

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, KeyValueStore};
use crate::error::{Result, StorageError};
use crate::notify::InstalledTrigger;

/// SQLite database holding the kv table and local triggers.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/breathwise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("breathwise.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS triggers (
                id          TEXT PRIMARY KEY,
                hour        INTEGER NOT NULL,
                minute      INTEGER NOT NULL,
                title       TEXT NOT NULL,
                body        TEXT NOT NULL,
                channel_id  TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_triggers_time ON triggers(hour, minute);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Local triggers ───────────────────────────────────────────────

    pub fn insert_trigger(&self, trigger: &InstalledTrigger) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO triggers (id, hour, minute, title, body, channel_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                trigger.id,
                trigger.hour,
                trigger.minute,
                trigger.title,
                trigger.body,
                trigger.channel_id,
                trigger.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Returns whether a row was deleted.
    pub fn delete_trigger(&self, id: &str) -> Result<bool, rusqlite::Error> {
        let n = self
            .conn
            .execute("DELETE FROM triggers WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn delete_all_triggers(&self) -> Result<usize, rusqlite::Error> {
        self.conn.execute("DELETE FROM triggers", [])
    }

    /// Installed triggers ordered by time of day.
    pub fn list_triggers(&self) -> Result<Vec<InstalledTrigger>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, hour, minute, title, body, channel_id, created_at
             FROM triggers
             ORDER BY hour, minute, created_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut triggers = Vec::new();
        for row in rows {
            let (id, hour, minute, title, body, channel_id, created_at) = row?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StorageError::Serialize {
                    key: format!("triggers/{id}"),
                    message: e.to_string(),
                })?;
            triggers.push(InstalledTrigger {
                id,
                hour,
                minute,
                title,
                body,
                channel_id,
                created_at,
            });
        }
        Ok(triggers)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Ok(self.kv_remove(key)?)
    }
}
