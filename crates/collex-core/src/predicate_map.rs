//! Predicate map - an insertion-ordered map with bulk predicate queries
//!
//! Wraps an owned [`IndexMap`] and forwards the plain map operations, adding
//! `every`, `some`, `find` and `filter`. Predicates receive `(value, key)` and
//! `every`/`some`/`find` stop at the first decisive entry.

use crate::error::{CollectionError, Result};
use indexmap::map::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use indexmap::{Equivalent, IndexMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A key-unique, insertion-ordered map with predicate queries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize + Hash + Eq, V: Serialize",
    deserialize = "K: Deserialize<'de> + Hash + Eq, V: Deserialize<'de>"
))]
pub struct PredicateMap<K, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> PredicateMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.entries.insert(key, value);
        self
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.contains_key(key)
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.contains_key(key)
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.shift_remove(key)
    }

    /// Remove an entry; `true` if it existed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.entries.values_mut()
    }

    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&V, &K),
    {
        for (key, value) in &self.entries {
            visitor(value, key);
        }
    }

    /// `true` iff the predicate holds for every entry (vacuously true).
    pub fn every<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.entries.iter().all(|(key, value)| predicate(value, key))
    }

    /// `true` iff the predicate holds for at least one entry.
    pub fn some<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.entries.iter().any(|(key, value)| predicate(value, key))
    }

    /// First matching `(key, value)` pair in iteration order.
    pub fn find<F>(&self, mut predicate: F) -> Option<(&K, &V)>
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.entries.iter().find(|&(key, value)| predicate(value, key))
    }

    /// Every matching `(key, value)` pair in iteration order.
    pub fn filter<F>(&self, mut predicate: F) -> Vec<(&K, &V)>
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.entries
            .iter()
            .filter(|&(key, value)| predicate(value, key))
            .collect()
    }
}

impl<V: DeserializeOwned> PredicateMap<String, V> {
    /// Load a flat attribute-value record, one entry per field.
    pub fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut map = Self::with_capacity(object.len());
        for (field, value) in object {
            let value = serde_json::from_value(value)
                .map_err(|_| CollectionError::FieldMismatch { field: field.clone() })?;
            map.entries.insert(field, value);
        }
        Ok(map)
    }

    /// Like [`from_object`](Self::from_object), rejecting anything that is not
    /// a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(object) => Self::from_object(object),
            other => Err(CollectionError::NotAnObject {
                found: crate::error::json_kind(&other).to_string(),
            }),
        }
    }
}

impl<K: Hash + Eq, V> Default for PredicateMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for PredicateMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Hash + Eq, V: Eq> Eq for PredicateMap<K, V> {}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for PredicateMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for PredicateMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K: Hash + Eq, V> From<Vec<(K, V)>> for PredicateMap<K, V> {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for PredicateMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for PredicateMap<String, serde_json::Value> {
    fn from(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object.into_iter().collect()
    }
}

impl<K, V> IntoIterator for PredicateMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a PredicateMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PredicateMap<&'static str, i32> {
        PredicateMap::from([("a", 1), ("b", 2), ("c", 3)])
    }

    #[test]
    fn test_map_basic_operations() {
        let mut map = sample();
        assert_eq!(map.get("b"), Some(&2));
        assert!(map.has("c"));
        assert_eq!(map.size(), 3);

        map.set("d", 4).set("a", 10);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(map.get("a"), Some(&10));

        assert!(map.delete("b"));
        assert!(!map.delete("b"));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "c", "d"]);

        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_every_and_some() {
        let map = sample();
        assert!(map.every(|value, _| *value > 0));
        assert!(!map.every(|value, _| *value > 1));
        assert!(map.some(|_, key| *key == "c"));
        assert!(!map.some(|value, _| *value > 3));
    }

    #[test]
    fn test_find_and_filter() {
        let map = sample();
        assert_eq!(map.find(|value, _| *value >= 2), Some((&"b", &2)));
        assert_eq!(map.find(|value, _| *value > 5), None);
        assert_eq!(map.filter(|value, _| *value != 2), vec![(&"a", &1), (&"c", &3)]);
        assert!(map.filter(|_, _| false).is_empty());
    }

    #[test]
    fn test_short_circuit() {
        let map = sample();
        let mut visited = 0;
        map.find(|value, _| {
            visited += 1;
            *value == 1
        });
        assert_eq!(visited, 1);

        let mut visited = 0;
        map.every(|value, _| {
            visited += 1;
            *value < 2
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_empty_map_predicates() {
        let map: PredicateMap<String, i32> = PredicateMap::new();
        assert!(map.every(|_, _| false));
        assert!(!map.some(|_, _| true));
        assert!(map.find(|_, _| true).is_none());
    }

    #[test]
    fn test_from_object() {
        let map: PredicateMap<String, i64> =
            PredicateMap::from_json(json!({"x": 1, "y": 2})).unwrap();
        assert_eq!(map.get("x"), Some(&1));
        assert_eq!(map.filter(|value, _| *value > 1), vec![(&"y".to_string(), &2)]);
    }

    #[test]
    fn test_from_object_keeps_field_order() {
        let record: serde_json::Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let map: PredicateMap<String, i64> = PredicateMap::from_json(record).unwrap();

        assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_from_object_errors() {
        let err = PredicateMap::<String, i64>::from_json(json!([1, 2])).unwrap_err();
        assert_eq!(err, CollectionError::NotAnObject { found: "array".into() });

        let err =
            PredicateMap::<String, i64>::from_json(json!({"x": 1, "y": "two"})).unwrap_err();
        assert_eq!(err, CollectionError::FieldMismatch { field: "y".into() });
    }

    #[test]
    fn test_map_serialization() {
        let mut map: PredicateMap<String, i32> = PredicateMap::new();
        map.insert("z".to_string(), 1);
        map.insert("a".to_string(), 2);

        let serialized = serde_json::to_string(&map).unwrap();
        assert_eq!(serialized, r#"{"z":1,"a":2}"#);

        let deserialized: PredicateMap<String, i32> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, map);
        assert_eq!(deserialized.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
