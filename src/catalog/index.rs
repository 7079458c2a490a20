//! Ordered, indexed view of one catalog section.
//!
//! Catalogs keep the order entries were declared in the dataset (matrix rows
//! and columns, unfilled listings, and interactive prompts follow it) and a
//! derived index for code lookups. Lookups return `Option`; there is no
//! default value baked into the catalog, so every caller decides what a
//! missing code means in its own context.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[derive(Clone, Debug, PartialEq)]
/// Catalog entries in declaration order plus a code → position index.
pub struct Catalog<K, V> {
    entries: Vec<(K, V)>,
    by_code: BTreeMap<K, usize>,
}

impl<K, V> Default for Catalog<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_code: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V> Catalog<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    ///
    /// Replacing keeps the original declaration position so re-inserting a
    /// code never reorders the catalog.
    pub fn insert(&mut self, code: K, value: V) -> Option<V> {
        if let Some(&pos) = self.by_code.get(&code) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.by_code.insert(code.clone(), self.entries.len());
        self.entries.push((code, value));
        None
    }

    /// Resolve an entry by code.
    pub fn get(&self, code: &K) -> Option<&V> {
        self.by_code.get(code).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, code: &K) -> Option<&mut V> {
        let pos = *self.by_code.get(code)?;
        Some(&mut self.entries[pos].1)
    }

    pub fn contains(&self, code: &K) -> bool {
        self.by_code.contains_key(code)
    }

    /// Codes in declaration order.
    pub fn codes(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(code, _)| code)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(code, value)| (code, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for Catalog<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for (code, value) in iter {
            catalog.insert(code, value);
        }
        catalog
    }
}

impl<K: Serialize, V: Serialize> Serialize for Catalog<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, value) in &self.entries {
            map.serialize_entry(code, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for Catalog<K, V>
where
    K: Deserialize<'de> + Ord + Clone,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CatalogVisitor(PhantomData))
    }
}

struct CatalogVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for CatalogVisitor<K, V>
where
    K: Deserialize<'de> + Ord + Clone,
    V: Deserialize<'de>,
{
    type Value = Catalog<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map keyed by string codes")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        // An empty YAML section (`competencies:`) parses as null.
        Ok(Catalog::new())
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut catalog = Catalog::new();
        while let Some((code, value)) = access.next_entry::<K, V>()? {
            catalog.insert(code, value);
        }
        Ok(catalog)
    }
}
