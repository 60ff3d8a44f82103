// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::config::consts::SNAPSHOT_PREFIX;
use crate::config::options::ExportOptions;
use crate::csv::{CHANGE_HEADERS, SNAPSHOT_HEADERS, change_rows, snapshot_rows, to_export_string};
use crate::diff::ChangeRecord;
use crate::snapshot::Item;

/// `2026-10-16 09:00:00` → `20261016_090000`
pub fn timestamp_stem(checked_at: &NaiveDateTime) -> String {
    checked_at.format("%Y%m%d_%H%M%S").to_string()
}

pub fn ensure_directory(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("Path exists but is not a directory: {}", dir.display()).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// Create parent dirs, then write header + rows in one go.
pub fn write_table(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
    sep: char,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(path, to_export_string(headers, rows, sep))?;
    Ok(())
}

pub fn export_changes(
    export: &ExportOptions,
    stem: &str,
    changes: &[ChangeRecord],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = export.change_path(stem);
    write_table(&path, CHANGE_HEADERS, &change_rows(changes), export.format.delim())?;
    Ok(path)
}

pub fn export_snapshot(
    export: &ExportOptions,
    stem: &str,
    items: &[Item],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = export.snapshot_path(stem);
    write_table(&path, SNAPSHOT_HEADERS, &snapshot_rows(items), export.format.delim())?;
    Ok(path)
}

/// Keep only the newest `keep` snapshot files in the data dir (by name, which
/// sorts by timestamp). `keep == 0` keeps everything. Returns what was removed.
pub fn cleanup_old_snapshots(export: &ExportOptions) -> Vec<PathBuf> {
    let keep = export.keep_snapshots;
    if keep == 0 { return Vec::new(); }

    let suffix = format!(".{}", export.format.ext());
    let entries = match fs::read_dir(&export.data_dir) {
        Ok(rd) => rd,
        Err(e) => {
            logd!("Export: cannot list {}: {e}", export.data_dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SNAPSHOT_PREFIX) && n.ends_with(&suffix))
        })
        .collect();

    if files.len() <= keep { return Vec::new(); }
    files.sort();

    let excess = files.len() - keep;
    let mut removed = Vec::with_capacity(excess);
    for f in files.into_iter().take(excess) {
        match fs::remove_file(&f) {
            Ok(()) => removed.push(f),
            Err(e) => logd!("Export: could not remove {}: {e}", f.display()),
        }
    }
    removed
}
