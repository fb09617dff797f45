//! String-keyed predicate map that converts back into a plain record.

use crate::error::{CollectionError, Result};
use crate::key::KeyValue;
use crate::predicate_map::PredicateMap;
use crate::record::Record;
use indexmap::map::{IntoIter, Iter, Keys, Values};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A [`PredicateMap`] keyed by field names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectBackedMap<V> {
    inner: PredicateMap<String, V>,
}

impl<V> ObjectBackedMap<V> {
    pub fn new() -> Self {
        Self {
            inner: PredicateMap::new(),
        }
    }

    pub fn as_predicate_map(&self) -> &PredicateMap<String, V> {
        &self.inner
    }

    pub fn as_predicate_map_mut(&mut self) -> &mut PredicateMap<String, V> {
        &mut self.inner
    }

    pub fn into_predicate_map(self) -> PredicateMap<String, V> {
        self.inner
    }

    pub fn insert(&mut self, field: impl Into<String>, value: V) -> Option<V> {
        self.inner.insert(field.into(), value)
    }

    pub fn set(&mut self, field: impl Into<String>, value: V) -> &mut Self {
        self.inner.insert(field.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&V> {
        self.inner.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut V> {
        self.inner.get_mut(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.inner.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<V> {
        self.inner.remove(field)
    }

    pub fn delete(&mut self, field: &str) -> bool {
        self.inner.delete(field)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn size(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn iter(&self) -> Iter<'_, String, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> Keys<'_, String, V> {
        self.inner.keys()
    }

    pub fn values(&self) -> Values<'_, String, V> {
        self.inner.values()
    }

    pub fn for_each<F>(&self, visitor: F)
    where
        F: FnMut(&V, &String),
    {
        self.inner.for_each(visitor)
    }

    pub fn every<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&V, &String) -> bool,
    {
        self.inner.every(predicate)
    }

    pub fn some<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&V, &String) -> bool,
    {
        self.inner.some(predicate)
    }

    pub fn find<F>(&self, predicate: F) -> Option<(&String, &V)>
    where
        F: FnMut(&V, &String) -> bool,
    {
        self.inner.find(predicate)
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<(&String, &V)>
    where
        F: FnMut(&V, &String) -> bool,
    {
        self.inner.filter(predicate)
    }
}

impl<V: Serialize> ObjectBackedMap<V> {
    /// Flatten into an attribute-value record: each key becomes a field
    /// holding its value.
    pub fn to_class(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut object = serde_json::Map::new();
        for (field, value) in self.inner.iter() {
            object.insert(field.clone(), serde_json::to_value(value)?);
        }
        Ok(object)
    }

    /// Convert into a typed struct whose fields are the map's keys.
    pub fn into_class<T: DeserializeOwned>(&self) -> Result<T> {
        let object = self.to_class()?;
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

impl<V: DeserializeOwned> ObjectBackedMap<V> {
    pub fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        Ok(Self {
            inner: PredicateMap::from_object(object)?,
        })
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(Self {
            inner: PredicateMap::from_json(value)?,
        })
    }

    /// Take a struct apart field by field.
    pub fn from_class<T: Serialize>(class: &T) -> Result<Self> {
        match serde_json::to_value(class)? {
            serde_json::Value::Object(object) => Self::from_object(object),
            other => Err(CollectionError::NotAnObject {
                found: crate::error::json_kind(&other).to_string(),
            }),
        }
    }
}

// Lets a map stand in as an upsert-set record.
impl<V> Record for ObjectBackedMap<V>
where
    for<'a> KeyValue: From<&'a V>,
{
    fn field(&self, name: &str) -> KeyValue {
        self.get(name).map_or(KeyValue::Undefined, KeyValue::from)
    }
}

impl<V> Default for ObjectBackedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<PredicateMap<String, V>> for ObjectBackedMap<V> {
    fn from(inner: PredicateMap<String, V>) -> Self {
        Self { inner }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ObjectBackedMap<serde_json::Value> {
    fn from(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            inner: PredicateMap::from(object),
        }
    }
}

impl<V> FromIterator<(String, V)> for ObjectBackedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<V> Extend<(String, V)> for ObjectBackedMap<V> {
    fn extend<I: IntoIterator<Item = (String, V)>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<V> IntoIterator for ObjectBackedMap<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a ObjectBackedMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
