// src/store/sqlite.rs
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::HarvestError;
use crate::snapshot::StateMap;

use super::{StateStore, decode, encode};

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(15);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS crawler_state (
  key        TEXT PRIMARY KEY,
  value      TEXT NOT NULL,
  updated_at TEXT NOT NULL
);";

/// Single-row-per-key JSON state in SQLite.
#[derive(Debug)]
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Open (or create) the database and ensure the table exists.
    pub fn open(path: &Path) -> Result<Self, HarvestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| HarvestError::storage(&format!("create {}", parent.display()), e))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| HarvestError::storage(&format!("open {}", path.display()), e))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, HarvestError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T, HarvestError> {
        let conn = self.conn.lock().map_err(|e| HarvestError::storage("sqlite connection", e))?;
        Ok(f(&conn)?)
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, key: &str) -> Result<StateMap, HarvestError> {
        let text: Option<String> = self.with_conn(|c| {
            c.query_row("SELECT value FROM crawler_state WHERE key = ?1", params![key], |row| row.get(0))
                .optional()
        })?;
        Ok(text.map(|t| decode(key, &t)).unwrap_or_default())
    }

    fn set(&self, key: &str, value: &StateMap) -> Result<(), HarvestError> {
        let json = encode(value)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.with_conn(|c| {
            c.execute(
                "INSERT INTO crawler_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, json, now],
            )
        })?;
        Ok(())
    }
}
