// src/diff.rs
//
// Previous vs. current state map → price/discount change records.
//
// Scope is drift on retained items only: keys present in one map but not
// the other are not changes. For each field the normalized integers decide
// when both sides have one; otherwise trimmed raw text is compared, and a
// side with neither is "unknown", which never counts as a change.

use crate::snapshot::{ItemFields, StateMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    pub link: String,
    pub rank_prev: Option<usize>,
    pub rank_cur: Option<usize>,
    pub discount_text_prev: String,
    pub discount_text_cur: String,
    pub price_text_prev: String,
    pub price_text_cur: String,
    pub discount_value_prev: Option<u64>,
    pub discount_value_cur: Option<u64>,
    pub price_value_prev: Option<u64>,
    pub price_value_cur: Option<u64>,
    pub discount_changed: bool,
    pub price_changed: bool,
}

impl ChangeRecord {
    fn between(link: &str, prev: &ItemFields, cur: &ItemFields, discount_changed: bool, price_changed: bool) -> Self {
        Self {
            link: link.to_string(),
            rank_prev: prev.rank,
            rank_cur: cur.rank,
            discount_text_prev: prev.discount_text.clone(),
            discount_text_cur: cur.discount_text.clone(),
            price_text_prev: prev.price_text.clone(),
            price_text_cur: cur.price_text.clone(),
            discount_value_prev: prev.discount_value,
            discount_value_cur: cur.discount_value,
            price_value_prev: prev.price_value,
            price_value_cur: cur.price_value,
            discount_changed,
            price_changed,
        }
    }
}

/// One comparable field: its normalized value and the raw display text.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    pub value: Option<u64>,
    pub text: &'a str,
}

impl FieldView<'_> {
    fn is_unknown(&self) -> bool {
        self.value.is_none() && self.text.trim().is_empty()
    }
}

/// Numeric first, raw text as fallback, unknown never differs.
pub fn field_changed(prev: FieldView<'_>, cur: FieldView<'_>) -> bool {
    if let (Some(a), Some(b)) = (prev.value, cur.value) {
        return a != b;
    }
    if prev.is_unknown() || cur.is_unknown() {
        return false;
    }
    let (p, c) = (prev.text.trim(), cur.text.trim());
    // a value with no text on one side: nothing textual to compare
    if p.is_empty() || c.is_empty() {
        return false;
    }
    p != c
}

/// Compare two state maps. Output follows `cur` in rank order.
/// Empty `prev` (first run, lost baseline) or empty `cur` yields no changes.
pub fn diff(prev: &StateMap, cur: &StateMap) -> Vec<ChangeRecord> {
    if prev.is_empty() || cur.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (link, c) in cur.iter_ranked() {
        let Some(p) = prev.get(link) else { continue };

        let discount_changed = field_changed(
            FieldView { value: p.discount_value, text: &p.discount_text },
            FieldView { value: c.discount_value, text: &c.discount_text },
        );
        let price_changed = field_changed(
            FieldView { value: p.price_value, text: &p.price_text },
            FieldView { value: c.price_value, text: &c.price_text },
        );

        if discount_changed || price_changed {
            out.push(ChangeRecord::between(link, p, c, discount_changed, price_changed));
        }
    }
    out
}
