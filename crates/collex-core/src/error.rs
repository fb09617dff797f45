//! Error types for the collection layer.
//!
//! Container operations themselves never fail; these errors only surface at
//! the serialization boundary (building maps from JSON, converting maps back
//! into records or typed structs).

use thiserror::Error;

/// Errors that can occur when converting between collections and records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Expected a flat object, found {found}")]
    NotAnObject { found: String },

    #[error("Field `{field}` could not be converted")]
    FieldMismatch { field: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollectionError>;

/// Short name of a JSON value's kind, used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
