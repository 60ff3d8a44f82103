// src/store/file.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::sanitize::sanitize_key_filename;
use crate::error::HarvestError;
use crate::snapshot::StateMap;

use super::{StateStore, decode, encode};

/// One `<key>.json` per logical key under `dir`.
#[derive(Clone, Debug)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key_filename(key)))
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<StateMap, HarvestError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(decode(key, &text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateMap::default()),
            Err(e) => Err(HarvestError::storage(&format!("read {}", path.display()), e)),
        }
    }

    /// Write to a sibling temp file, then rename over the old value.
    fn set(&self, key: &str, value: &StateMap) -> Result<(), HarvestError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir)
            .map_err(|e| HarvestError::storage(&format!("create {}", self.dir.display()), e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encode(value)?)
            .map_err(|e| HarvestError::storage(&format!("write {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| HarvestError::storage(&format!("replace {}", path.display()), e))?;
        Ok(())
    }
}
