// tests/export.rs
use std::fs;

use pricewatch::config::{ExportFormat, ExportOptions};
use pricewatch::file::{cleanup_old_snapshots, export_snapshot};
use pricewatch::snapshot::Item;

fn export_in(dir: &std::path::Path, keep: usize) -> ExportOptions {
    ExportOptions {
        data_dir: dir.to_path_buf(),
        format: ExportFormat::Tsv,
        save_snapshots: true,
        keep_snapshots: keep,
    }
}

#[test]
fn snapshot_table_is_one_row_per_item() {
    let dir = tempfile::tempdir().unwrap();
    let export = export_in(dir.path(), 0);
    let items = vec![
        Item::new(1, "https://x/1".into(), "Coat, long".into(), "20%".into(), "12,900원".into()),
        Item::new(2, "https://x/2".into(), "Scarf".into(), String::new(), "품절".into()),
    ];

    let path = export_snapshot(&export, "20261016_090000", &items).unwrap();
    assert_eq!(path, dir.path().join("snapshot_20261016_090000.tsv"));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "rank\thref\tproduct_name\tdiscount\tprice\tdiscount_int\tprice_int");
    assert_eq!(lines[1], "1\thttps://x/1\tCoat, long\t20%\t12,900원\t20\t12900");
    assert_eq!(lines[2], "2\thttps://x/2\tScarf\t\t품절\t\t");
}

#[test]
fn cleanup_keeps_newest_snapshots_only() {
    let dir = tempfile::tempdir().unwrap();
    let export = export_in(dir.path(), 2);
    for stem in ["20261016_080000", "20261016_090000", "20261016_100000"] {
        export_snapshot(&export, stem, &[]).unwrap();
    }
    fs::write(dir.path().join("notes.tsv"), "keep me").unwrap();

    let removed = cleanup_old_snapshots(&export);
    assert_eq!(removed, vec![dir.path().join("snapshot_20261016_080000.tsv")]);
    assert!(dir.path().join("snapshot_20261016_090000.tsv").exists());
    assert!(dir.path().join("snapshot_20261016_100000.tsv").exists());
    assert!(dir.path().join("notes.tsv").exists());
}

#[test]
fn keep_zero_means_keep_everything() {
    let dir = tempfile::tempdir().unwrap();
    let export = export_in(dir.path(), 0);
    for stem in ["a", "b", "c"] {
        export_snapshot(&export, stem, &[]).unwrap();
    }
    assert!(cleanup_old_snapshots(&export).is_empty());
}
