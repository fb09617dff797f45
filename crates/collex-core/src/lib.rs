//! # collex-core
//!
//! Extended associative containers over an insertion-ordered map.
//!
//! This crate provides:
//! - `KeyedUpsertSet`: records deduplicated by one of their own fields, with
//!   hooks for collisions and fresh keys
//! - `PredicateMap`: a map with `every`/`some`/`find`/`filter` queries
//! - `ObjectBackedMap`: a string-keyed predicate map that converts back into
//!   a plain record
//!
//! ## Example
//!
//! ```rust
//! use collex_core::{KeyedUpsertSet, SetOptions};
//! use serde_json::json;
//!
//! let mut users = KeyedUpsertSet::with_options(SetOptions::new("id").replace_on_exist(true));
//! users.insert_one(json!({"id": 1, "name": "ada"}));
//! users.insert_one(json!({"id": 1, "name": "grace"}));
//!
//! assert_eq!(users.size(), 1);
//! assert_eq!(users.get(1), Some(&json!({"id": 1, "name": "grace"})));
//! ```

pub mod error;
pub mod key;
pub mod object_map;
pub mod predicate_map;
pub mod record;
pub mod upsert_set;

pub use error::{CollectionError, Result};
pub use key::KeyValue;
pub use object_map::ObjectBackedMap;
pub use predicate_map::PredicateMap;
pub use record::Record;
pub use upsert_set::{
    KeyedUpsertSet, OnExist, OnNotExist, ResetOptions, SetConfig, SetOptions,
};
