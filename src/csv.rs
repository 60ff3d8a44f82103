// src/csv.rs
use std::io::{self, Write};

use crate::diff::ChangeRecord;
use crate::snapshot::Item;

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header line plus rows, as one string.
pub fn to_export_string(headers: &[&str], rows: &[Vec<String>], sep: char) -> String {
    let mut buf: Vec<u8> = Vec::new();

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let _ = write_row(&mut buf, &header, sep);
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

/* ---------------- Tables ---------------- */

pub const CHANGE_HEADERS: &[&str] = &[
    "href",
    "rank_prev", "rank_cur",
    "discount_prev", "discount_cur",
    "price_prev", "price_cur",
    "discount_prev_int", "discount_cur_int",
    "price_prev_int", "price_cur_int",
];

pub const SNAPSHOT_HEADERS: &[&str] = &[
    "rank", "href", "product_name", "discount", "price", "discount_int", "price_int",
];

fn cell<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub fn change_rows(changes: &[ChangeRecord]) -> Vec<Vec<String>> {
    changes
        .iter()
        .map(|c| vec![
            c.link.clone(),
            cell(c.rank_prev), cell(c.rank_cur),
            c.discount_text_prev.clone(), c.discount_text_cur.clone(),
            c.price_text_prev.clone(), c.price_text_cur.clone(),
            cell(c.discount_value_prev), cell(c.discount_value_cur),
            cell(c.price_value_prev), cell(c.price_value_cur),
        ])
        .collect()
}

pub fn snapshot_rows(items: &[Item]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|it| vec![
            it.rank.to_string(),
            it.link.clone(),
            it.name.clone(),
            it.discount_text.clone(),
            it.price_text.clone(),
            cell(it.discount_value),
            cell(it.price_value),
        ])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a".into(), "b,c".into(), "say \"hi\"".into()], ',').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,\"b,c\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn tsv_leaves_commas_alone() {
        let out = to_export_string(&["price"], &[vec!["12,900원".into()]], '\t');
        assert_eq!(out, "price\n12,900원\n");
    }

    #[test]
    fn change_row_matches_headers() {
        let rec = ChangeRecord {
            link: "https://x/1".into(),
            rank_prev: Some(3),
            rank_cur: Some(1),
            discount_text_prev: "10%".into(),
            discount_text_cur: "10%".into(),
            price_text_prev: "1,000원".into(),
            price_text_cur: "1,200원".into(),
            discount_value_prev: Some(10),
            discount_value_cur: Some(10),
            price_value_prev: Some(1000),
            price_value_cur: Some(1200),
            discount_changed: false,
            price_changed: true,
        };
        let rows = change_rows(&[rec]);
        assert_eq!(rows[0].len(), CHANGE_HEADERS.len());
        assert_eq!(rows[0][0], "https://x/1");
        assert_eq!(rows[0][9], "1000");
        assert_eq!(rows[0][10], "1200");
    }

    #[test]
    fn missing_values_are_blank_cells() {
        let it = Item::new(1, "https://x/1".into(), "Coat".into(), String::new(), "품절".into());
        let rows = snapshot_rows(&[it]);
        assert_eq!(rows[0].len(), SNAPSHOT_HEADERS.len());
        assert_eq!(rows[0][5], "");
        assert_eq!(rows[0][6], "");
    }
}
