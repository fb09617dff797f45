//! Records: values with named fields.
//!
//! A [`KeyedUpsertSet`](crate::upsert_set::KeyedUpsertSet) never looks inside
//! its elements except through [`Record::field`], so any type that can name
//! its fields can be stored. JSON objects work out of the box; plain structs
//! implement the trait by matching on the field name.

use crate::key::KeyValue;
use std::rc::Rc;
use std::sync::Arc;

/// A structured value whose fields can be looked up by name.
pub trait Record {
    /// Value of the field called `name`, or [`KeyValue::Undefined`] when the
    /// record has no such field.
    fn field(&self, name: &str) -> KeyValue;
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> KeyValue {
        self.get(name).map_or(KeyValue::Undefined, KeyValue::from)
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> KeyValue {
        self.get(name).map_or(KeyValue::Undefined, KeyValue::from)
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> KeyValue {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn field(&self, name: &str) -> KeyValue {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Rc<T> {
    fn field(&self, name: &str) -> KeyValue {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn field(&self, name: &str) -> KeyValue {
        (**self).field(name)
    }
}
