//! Keyed upsert set - records deduplicated by one of their own fields
//!
//! Every record is stored under the value of its key field. Inserting a
//! record whose key is already present is a collision: the `on_exist` hook
//! observes `(stored, incoming)` and the replace policy decides which of the
//! two stays. Fresh keys trigger `on_not_exist` and are appended.
//!
//! Iteration follows first-seen key order; replacing a record keeps its
//! position.

use crate::error::Result;
use crate::key::KeyValue;
use crate::record::Record;
use indexmap::map::{Iter, Keys, Values};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use tracing::{debug, trace};

/// Hook invoked with `(stored, incoming)` when an inserted key already exists.
pub type OnExist<T> = Box<dyn FnMut(&T, &T)>;

/// Hook invoked with the incoming record when its key is new.
pub type OnNotExist<T> = Box<dyn FnMut(&T)>;

/// Construction options for a [`KeyedUpsertSet`].
pub struct SetOptions<T> {
    /// Name of the field that identifies a record.
    pub key: String,
    pub on_exist: Option<OnExist<T>>,
    pub on_not_exist: Option<OnNotExist<T>>,
    /// Overwrite the stored record on collision (default: keep the stored one).
    pub replace_on_exist: bool,
    /// Records inserted, in order, right after construction.
    pub initial_values: Vec<T>,
}

impl<T> SetOptions<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            on_exist: None,
            on_not_exist: None,
            replace_on_exist: false,
            initial_values: Vec::new(),
        }
    }

    pub fn on_exist<F>(mut self, on_exist: F) -> Self
    where
        F: FnMut(&T, &T) + 'static,
    {
        self.on_exist = Some(Box::new(on_exist));
        self
    }

    pub fn on_not_exist<F>(mut self, on_not_exist: F) -> Self
    where
        F: FnMut(&T) + 'static,
    {
        self.on_not_exist = Some(Box::new(on_not_exist));
        self
    }

    pub fn replace_on_exist(mut self, replace: bool) -> Self {
        self.replace_on_exist = replace;
        self
    }

    pub fn initial_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.initial_values = values.into_iter().collect();
        self
    }
}

/// The serializable part of [`SetOptions`]: everything except the hooks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetConfig<T> {
    pub key: String,
    #[serde(default, alias = "replaceOnExist")]
    pub replace_on_exist: bool,
    #[serde(default = "Vec::new", alias = "initialValues")]
    pub initial_values: Vec<T>,
}

impl<T: DeserializeOwned> SetConfig<T> {
    /// Parse a config such as `{"key": "id", "replace_on_exist": true}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<T> From<SetConfig<T>> for SetOptions<T> {
    fn from(config: SetConfig<T>) -> Self {
        SetOptions::new(config.key)
            .replace_on_exist(config.replace_on_exist)
            .initial_values(config.initial_values)
    }
}

/// Options for [`KeyedUpsertSet::reset`]. `None` leaves the current setting
/// untouched.
pub struct ResetOptions<T> {
    pub key: Option<String>,
    pub on_exist: Option<OnExist<T>>,
    pub on_not_exist: Option<OnNotExist<T>>,
    pub replace_on_exist: Option<bool>,
}

impl<T> Default for ResetOptions<T> {
    fn default() -> Self {
        Self {
            key: None,
            on_exist: None,
            on_not_exist: None,
            replace_on_exist: None,
        }
    }
}

impl<T> ResetOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn on_exist<F>(mut self, on_exist: F) -> Self
    where
        F: FnMut(&T, &T) + 'static,
    {
        self.on_exist = Some(Box::new(on_exist));
        self
    }

    pub fn on_not_exist<F>(mut self, on_not_exist: F) -> Self
    where
        F: FnMut(&T) + 'static,
    {
        self.on_not_exist = Some(Box::new(on_not_exist));
        self
    }

    pub fn replace_on_exist(mut self, replace: bool) -> Self {
        self.replace_on_exist = Some(replace);
        self
    }
}

/// What a single upsert step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Inserted,
    Kept,
    Replaced,
}

/// A set of records deduplicated by a key field.
pub struct KeyedUpsertSet<T> {
    key_field: String,
    on_exist: Option<OnExist<T>>,
    on_not_exist: Option<OnNotExist<T>>,
    replace_on_exist: bool,
    /// Maps extracted key values to the resident record
    entries: IndexMap<KeyValue, T>,
}

impl<T: Record> KeyedUpsertSet<T> {
    /// Create an empty set keyed by `key`, keeping stored records on collision.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_options(SetOptions::new(key))
    }

    /// Create a set from options, seeding it with `initial_values`.
    pub fn with_options(options: SetOptions<T>) -> Self {
        let SetOptions {
            key,
            on_exist,
            on_not_exist,
            replace_on_exist,
            initial_values,
        } = options;

        let mut set = Self {
            key_field: key,
            on_exist,
            on_not_exist,
            replace_on_exist,
            entries: IndexMap::with_capacity(initial_values.len()),
        };
        set.insert_many(initial_values);
        set
    }

    /// Insert one record, returning the set for chaining.
    pub fn insert_one(&mut self, value: T) -> &mut Self {
        self.upsert(value);
        self
    }

    /// Insert records in order, returning the set for chaining.
    pub fn insert_many<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.upsert(value);
        }
        self
    }

    /// Insert one record and return the record now resident under its key,
    /// which is the stored one when a collision kept it.
    pub fn insert_one_returning(&mut self, value: T) -> &T {
        let index = self.upsert(value);
        &self.entries[index]
    }

    /// Insert records in order and return, per input, the record resident
    /// under its key right after that input was processed.
    pub fn insert_many_returning<I>(&mut self, values: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        T: Clone,
    {
        values
            .into_iter()
            .map(|value| {
                let index = self.upsert(value);
                self.entries[index].clone()
            })
            .collect()
    }

    /// Single upsert step. Returns the index of the resident record.
    fn upsert(&mut self, value: T) -> usize {
        let key = value.field(&self.key_field);

        let (index, outcome) = match self.entries.get_index_of(&key) {
            Some(index) => {
                if let Some(on_exist) = self.on_exist.as_mut() {
                    on_exist(&self.entries[index], &value);
                }
                if self.replace_on_exist {
                    if let Some((_, slot)) = self.entries.get_index_mut(index) {
                        *slot = value;
                    }
                    (index, Outcome::Replaced)
                } else {
                    (index, Outcome::Kept)
                }
            }
            None => {
                if let Some(on_not_exist) = self.on_not_exist.as_mut() {
                    on_not_exist(&value);
                }
                trace!(key = %key, field = %self.key_field, outcome = ?Outcome::Inserted, "upsert");
                let (index, _) = self.entries.insert_full(key, value);
                return index;
            }
        };

        trace!(key = %key, field = %self.key_field, outcome = ?outcome, "upsert");
        index
    }
}

impl<T> KeyedUpsertSet<T> {
    /// Look up a record by key value (not by record).
    pub fn get(&self, key: impl Into<KeyValue>) -> Option<&T> {
        self.entries.get(&key.into())
    }

    pub fn has(&self, key: impl Into<KeyValue>) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Remove the record stored under `key`. Returns `true` if one existed.
    pub fn delete(&mut self, key: impl Into<KeyValue>) -> bool {
        self.remove(key).is_some()
    }

    /// Remove and return the record stored under `key`, keeping the order of
    /// the remaining records.
    pub fn remove(&mut self, key: impl Into<KeyValue>) -> Option<T> {
        self.entries.shift_remove(&key.into())
    }

    /// First record (in iteration order) matching the predicate.
    pub fn find<F>(&self, mut predicate: F) -> Option<&T>
    where
        F: FnMut(&T, &KeyValue) -> bool,
    {
        self.entries
            .iter()
            .find(|&(key, value)| predicate(value, key))
            .map(|(_, value)| value)
    }

    /// All records matching the predicate, in iteration order.
    pub fn filter<F>(&self, mut predicate: F) -> Vec<&T>
    where
        F: FnMut(&T, &KeyValue) -> bool,
    {
        self.entries
            .iter()
            .filter(|&(key, value)| predicate(value, key))
            .map(|(_, value)| value)
            .collect()
    }

    /// `true` if every record matches; stops at the first miss.
    pub fn every<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T, &KeyValue) -> bool,
    {
        self.entries.iter().all(|(key, value)| predicate(value, key))
    }

    /// `true` if any record matches; stops at the first hit.
    pub fn some<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T, &KeyValue) -> bool,
    {
        self.entries.iter().any(|(key, value)| predicate(value, key))
    }

    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T, &KeyValue),
    {
        for (key, value) in &self.entries {
            visitor(value, key);
        }
    }

    pub fn to_array(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<KeyValue> {
        self.entries.keys().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Lazy `(key, record)` pairs in iteration order.
    pub fn entries(&self) -> Iter<'_, KeyValue, T> {
        self.entries.iter()
    }

    pub fn value_entries(&self) -> Values<'_, KeyValue, T> {
        self.entries.values()
    }

    pub fn key_entries(&self) -> Keys<'_, KeyValue, T> {
        self.entries.keys()
    }

    /// Apply every provided option, then clear all records.
    pub fn reset(&mut self, options: ResetOptions<T>) -> &mut Self {
        let ResetOptions {
            key,
            on_exist,
            on_not_exist,
            replace_on_exist,
        } = options;

        if let Some(on_exist) = on_exist {
            self.on_exist = Some(on_exist);
        }
        if let Some(on_not_exist) = on_not_exist {
            self.on_not_exist = Some(on_not_exist);
        }
        // An empty field name counts as "not given".
        if let Some(key) = key.filter(|key| !key.is_empty()) {
            self.key_field = key;
        }
        if let Some(replace) = replace_on_exist {
            self.replace_on_exist = replace;
        }

        debug!(
            field = %self.key_field,
            replace_on_exist = self.replace_on_exist,
            dropped = self.entries.len(),
            "reset keyed upsert set"
        );
        self.entries.clear();
        self
    }

    /// Name of the field records are keyed by.
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn replaces_on_exist(&self) -> bool {
        self.replace_on_exist
    }

    /// Change the key field without touching stored records. Records already
    /// stored stay under the keys they were inserted with; use
    /// [`reset`](Self::reset) to re-key from scratch.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key_field = key.into();
        debug!(field = %self.key_field, "key field changed without reset");
    }

    pub fn set_replace_on_exist(&mut self, replace: bool) {
        self.replace_on_exist = replace;
    }

    pub fn set_on_exist<F>(&mut self, on_exist: F)
    where
        F: FnMut(&T, &T) + 'static,
    {
        self.on_exist = Some(Box::new(on_exist));
    }

    pub fn clear_on_exist(&mut self) {
        self.on_exist = None;
    }

    pub fn set_on_not_exist<F>(&mut self, on_not_exist: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.on_not_exist = Some(Box::new(on_not_exist));
    }

    pub fn clear_on_not_exist(&mut self) {
        self.on_not_exist = None;
    }
}

impl<T: Record> Extend<T> for KeyedUpsertSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_many(iter);
    }
}

impl<'a, T> IntoIterator for &'a KeyedUpsertSet<T> {
    type Item = (&'a KeyValue, &'a T);
    type IntoIter = Iter<'a, KeyValue, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Serialized as the sequence of resident records; hooks are not state.
impl<T: Serialize> Serialize for KeyedUpsertSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<T: fmt::Debug> fmt::Debug for KeyedUpsertSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedUpsertSet")
            .field("key_field", &self.key_field)
            .field("replace_on_exist", &self.replace_on_exist)
            .field("on_exist", &self.on_exist.is_some())
            .field("on_not_exist", &self.on_not_exist.is_some())
            .field("entries", &self.entries)
            .finish()
    }
}
