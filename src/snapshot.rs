// src/snapshot.rs
//
// Collected items and their persisted, keyed form.
//
// - Item:      one product card read during a collection pass.
// - Snapshot:  the items of one pass, in discovery (rank) order.
// - StateMap:  canonical link → ItemFields; the unit of persistence and diffing.
//              Rank lives on each entry; the map itself is keyed, not ordered.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::normalize;
use crate::core::normalize::normalize_opt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub rank: usize,
    pub link: String,
    pub name: String,
    pub discount_text: String,
    pub price_text: String,
    pub discount_value: Option<u64>,
    pub price_value: Option<u64>,
}

impl Item {
    /// Build from raw card text; numeric values are derived here once.
    pub fn new(rank: usize, link: String, name: String, discount_text: String, price_text: String) -> Self {
        let discount_value = normalize(&discount_text);
        let price_value = normalize(&price_text);
        Self { rank, link, name, discount_text, price_text, discount_value, price_value }
    }

    /// Build from what a card yielded; an absent field is empty text with no value.
    pub fn read(
        rank: usize,
        link: String,
        name: Option<String>,
        discount_text: Option<String>,
        price_text: Option<String>,
    ) -> Self {
        let discount_value = normalize_opt(discount_text.as_deref());
        let price_value = normalize_opt(price_text.as_deref());
        Self {
            rank,
            link,
            name: name.unwrap_or_default(),
            discount_text: discount_text.unwrap_or_default(),
            price_text: price_text.unwrap_or_default(),
            discount_value,
            price_value,
        }
    }

    pub fn fields(&self) -> ItemFields {
        ItemFields {
            rank: Some(self.rank),
            display_name: self.name.clone(),
            discount_text: self.discount_text.clone(),
            price_text: self.price_text.clone(),
            discount_value: self.discount_value,
            price_value: self.price_value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    items: Vec<Item>,
}

impl Snapshot {
    pub fn new(items: Vec<Item>) -> Self { Self { items } }
    pub fn items(&self) -> &[Item] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Keyed form for persistence/diffing. Blank links never become keys.
    pub fn to_state_map(&self) -> StateMap {
        let mut map = StateMap::default();
        for item in &self.items {
            if item.link.trim().is_empty() { continue; }
            map.insert(item.link.clone(), item.fields());
        }
        map
    }
}

/// Persisted per-item fields.
///
/// Reading is lenient: every field has a default, wrong JSON types degrade to
/// "no value", and the legacy column names are accepted. When an entry
/// carries both names for a field, the current name wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredFields")]
pub struct ItemFields {
    pub rank: Option<usize>,
    pub display_name: String,
    pub discount_text: String,
    pub price_text: String,
    pub discount_value: Option<u64>,
    pub price_value: Option<u64>,
}

/// On-disk shape of [`ItemFields`], current and legacy names side by side.
#[derive(Deserialize)]
struct StoredFields {
    #[serde(default, deserialize_with = "lenient_uint")]
    rank: Option<usize>,
    #[serde(default, deserialize_with = "lenient_text")]
    display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    discount_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    discount_raw: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    price_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    price_raw: Option<String>,
    #[serde(default, deserialize_with = "lenient_uint")]
    discount_value: Option<u64>,
    #[serde(default, deserialize_with = "lenient_uint")]
    discount_int: Option<u64>,
    #[serde(default, deserialize_with = "lenient_uint")]
    price_value: Option<u64>,
    #[serde(default, deserialize_with = "lenient_uint")]
    price_int: Option<u64>,
}

impl From<StoredFields> for ItemFields {
    fn from(s: StoredFields) -> Self {
        Self {
            rank: s.rank,
            display_name: s.display_name.or(s.product_name).unwrap_or_default(),
            discount_text: s.discount_text.or(s.discount_raw).unwrap_or_default(),
            price_text: s.price_text.or(s.price_raw).unwrap_or_default(),
            discount_value: s.discount_value.or(s.discount_int),
            price_value: s.price_value.or(s.price_int),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap(BTreeMap<String, ItemFields>);

impl StateMap {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn get(&self, link: &str) -> Option<&ItemFields> { self.0.get(link) }
    pub fn contains(&self, link: &str) -> bool { self.0.contains_key(link) }

    pub fn insert(&mut self, link: String, fields: ItemFields) -> Option<ItemFields> {
        self.0.insert(link, fields)
    }

    /// Entries keyed by link, in whatever order the map holds them.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ItemFields)> {
        self.0.iter()
    }

    /// Entries in rank order; unranked entries last, ties by link.
    pub fn iter_ranked(&self) -> Vec<(&String, &ItemFields)> {
        let mut v: Vec<_> = self.0.iter().collect();
        v.sort_by(|(ka, a), (kb, b)| {
            let ra = a.rank.unwrap_or(usize::MAX);
            let rb = b.rank.unwrap_or(usize::MAX);
            ra.cmp(&rb).then_with(|| ka.cmp(kb))
        });
        v
    }

    /// Parse stored JSON. Anything that is not an object becomes an empty
    /// map; entries that are not objects are dropped.
    pub fn from_json_value(value: Value) -> Self {
        let Value::Object(obj) = value else {
            logw!("State: stored value is not a JSON object; treating as empty");
            return Self::default();
        };

        let mut map = Self::default();
        for (link, entry) in obj {
            if link.trim().is_empty() { continue; }
            match serde_json::from_value::<ItemFields>(entry) {
                Ok(fields) => { map.insert(link, fields); }
                Err(e) => logw!("State: dropping unreadable entry {link}: {e}"),
            }
        }
        map
    }
}

impl FromIterator<(String, ItemFields)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (String, ItemFields)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/* ---------------- Lenient field readers ---------------- */

fn lenient_uint<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let v = Value::deserialize(de)?;
    let n = match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            // 12900.0 from a float column
            n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64).map(|f| f as u64)
        }),
        Value::String(s) => normalize(&s),
        _ => None,
    };
    Ok(n.and_then(|n| T::try_from(n).ok()))
}

fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
