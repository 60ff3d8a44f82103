// src/store/mod.rs
//! # State store
//!
//! Keeps the last known [`StateMap`] per logical run key, so the next run has
//! a baseline to diff against.
//!
//! ## Contract
//! - `get` of a key never written returns an empty map, not an error.
//! - `set` replaces the whole value under the key (no merge); concurrent
//!   writers resolve as last-writer-wins.
//! - Any connectivity/IO failure is `StorageUnavailable` and aborts the run.
//!   A run must never mistake an unreachable store for "no baseline".
//! - A stored value that is readable but not a JSON object is logged and
//!   read as empty.
//!
//! ## Backends
//! - [`FileStateStore`] – one JSON file per key (default, `.store/state/`).
//! - [`SqliteStateStore`] – `crawler_state` table in a SQLite file.
//! - [`MemoryStateStore`] – in-process, for tests and embedding.

mod file;
mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::{StateBackend, StateOptions};
use crate::error::HarvestError;
use crate::snapshot::StateMap;

pub use file::FileStateStore;
pub use sqlite::SqliteStateStore;

pub trait StateStore {
    fn get(&self, key: &str) -> Result<StateMap, HarvestError>;
    fn set(&self, key: &str, value: &StateMap) -> Result<(), HarvestError>;
}

/// Open the backend named by the config.
pub fn open(opts: &StateOptions) -> Result<Box<dyn StateStore>, HarvestError> {
    let store: Box<dyn StateStore> = match &opts.backend {
        StateBackend::Files(dir) => Box::new(FileStateStore::new(dir)),
        StateBackend::Sqlite(path) => Box::new(SqliteStateStore::open(path)?),
    };
    Ok(store)
}

/// Parse stored JSON text into a map (see module docs for tolerance rules).
pub(crate) fn decode(key: &str, text: &str) -> StateMap {
    match serde_json::from_str(text) {
        Ok(value) => StateMap::from_json_value(value),
        Err(e) => {
            logw!("State: value under {key} is not valid JSON ({e}); treating as empty");
            StateMap::default()
        }
    }
}

pub(crate) fn encode(value: &StateMap) -> Result<String, HarvestError> {
    serde_json::to_string(value).map_err(|e| HarvestError::storage("encode state", e))
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, StateMap>>,
}

impl MemoryStateStore {
    pub fn new() -> Self { Self::default() }

    pub fn with(key: &str, value: StateMap) -> Self {
        let store = Self::default();
        if let Ok(mut m) = store.entries.lock() {
            m.insert(key.to_string(), value);
        }
        store
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<StateMap, HarvestError> {
        let m = self.entries.lock().map_err(|e| HarvestError::storage("memory store", e))?;
        Ok(m.get(key).cloned().unwrap_or_default())
    }

    fn set(&self, key: &str, value: &StateMap) -> Result<(), HarvestError> {
        let mut m = self.entries.lock().map_err(|e| HarvestError::storage("memory store", e))?;
        m.insert(key.to_string(), value.clone());
        Ok(())
    }
}
