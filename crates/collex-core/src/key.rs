//! Identity values extracted from record fields.
//!
//! A [`KeyValue`] is what a [`KeyedUpsertSet`](crate::upsert_set::KeyedUpsertSet)
//! stores its records under. Numbers follow "same value zero" equality:
//! `1`, `1u64` and `1.0` are one key, `-0.0` equals `0`, and every NaN is
//! the same key.

use serde::{Serialize, Serializer};
use std::fmt;

/// Bit pattern every NaN is folded into.
const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

/// A hashable key derived from one field of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// The field does not exist on the record.
    Undefined,
    /// The field exists and is explicitly null.
    Null,
    Bool(bool),
    /// Any integral number representable as `i64`.
    Int(i64),
    /// Integral numbers above `i64::MAX`.
    UInt(u64),
    /// Non-integral or non-finite numbers, stored as canonical bits.
    Float(u64),
    Text(String),
    /// Arrays and objects, keyed by their canonical JSON text.
    Composite(String),
}

impl KeyValue {
    /// Build a numeric key, folding integral floats into `Int`/`UInt`.
    pub fn from_f64(n: f64) -> Self {
        if n.is_nan() {
            return KeyValue::Float(CANONICAL_NAN);
        }
        if n.fract() == 0.0 {
            if (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&n) {
                return KeyValue::Int(n as i64);
            }
            if n > 0.0 && n < 18_446_744_073_709_551_616.0 {
                return KeyValue::UInt(n as u64);
            }
        }
        KeyValue::Float(n.to_bits())
    }

    pub fn from_u64(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(i) => KeyValue::Int(i),
            Err(_) => KeyValue::UInt(n),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, KeyValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KeyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeyValue::Int(i) => Some(*i as f64),
            KeyValue::UInt(u) => Some(*u as f64),
            KeyValue::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

impl Default for KeyValue {
    fn default() -> Self {
        KeyValue::Undefined
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Undefined => write!(f, "undefined"),
            KeyValue::Null => write!(f, "null"),
            KeyValue::Bool(b) => write!(f, "{}", b),
            KeyValue::Int(i) => write!(f, "{}", i),
            KeyValue::UInt(u) => write!(f, "{}", u),
            KeyValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            KeyValue::Text(s) => write!(f, "{:?}", s),
            KeyValue::Composite(json) => write!(f, "{}", json),
        }
    }
}

impl Serialize for KeyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyValue::Undefined | KeyValue::Null => serializer.serialize_none(),
            KeyValue::Bool(b) => serializer.serialize_bool(*b),
            KeyValue::Int(i) => serializer.serialize_i64(*i),
            KeyValue::UInt(u) => serializer.serialize_u64(*u),
            KeyValue::Float(bits) => serializer.serialize_f64(f64::from_bits(*bits)),
            KeyValue::Text(s) | KeyValue::Composite(s) => serializer.serialize_str(s),
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyValue {
            fn from(n: $t) -> Self {
                KeyValue::Int(n as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyValue {
            fn from(n: $t) -> Self {
                KeyValue::from_u64(n as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f64> for KeyValue {
    fn from(n: f64) -> Self {
        KeyValue::from_f64(n)
    }
}

impl From<f32> for KeyValue {
    fn from(n: f32) -> Self {
        KeyValue::from_f64(n as f64)
    }
}

impl From<bool> for KeyValue {
    fn from(b: bool) -> Self {
        KeyValue::Bool(b)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Text(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        KeyValue::Text(s)
    }
}

impl From<&String> for KeyValue {
    fn from(s: &String) -> Self {
        KeyValue::Text(s.clone())
    }
}

impl From<&KeyValue> for KeyValue {
    fn from(key: &KeyValue) -> Self {
        key.clone()
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyValue::Null, Into::into)
    }
}

impl From<&serde_json::Value> for KeyValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => KeyValue::Null,
            Value::Bool(b) => KeyValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    KeyValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    KeyValue::from_u64(u)
                } else {
                    KeyValue::from_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => KeyValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => KeyValue::Composite(canonical_json(value)),
        }
    }
}

impl From<serde_json::Value> for KeyValue {
    fn from(value: serde_json::Value) -> Self {
        KeyValue::from(&value)
    }
}

/// JSON text with object keys sorted at every depth, independent of how
/// `serde_json::Map` orders its entries.
pub fn canonical_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    use serde_json::Value;

    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(object) => {
            let mut fields: Vec<_> = object.iter().collect();
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push('{');
            for (i, (field, item)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Quoted and escaped exactly as serde_json writes strings.
                out.push_str(&Value::String(field.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_use_same_value_zero() {
        assert_eq!(KeyValue::from(1i32), KeyValue::from(1.0f64));
        assert_eq!(KeyValue::from(1u64), KeyValue::from(1i64));
        assert_eq!(KeyValue::from(-0.0f64), KeyValue::from(0i64));
        assert_eq!(KeyValue::from(f64::NAN), KeyValue::from(-f64::NAN));
        assert_ne!(KeyValue::from(1.5f64), KeyValue::from(1i64));
    }

    #[test]
    fn test_large_unsigned_stays_distinct() {
        let big = KeyValue::from(u64::MAX);
        assert_eq!(big, KeyValue::UInt(u64::MAX));
        assert_ne!(big, KeyValue::from(i64::MAX));
        assert_eq!(
            KeyValue::from(1e19f64),
            KeyValue::UInt(10_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_json_values() {
        assert_eq!(KeyValue::from(&json!(null)), KeyValue::Null);
        assert_eq!(KeyValue::from(&json!("a")), KeyValue::from("a"));
        assert_eq!(KeyValue::from(&json!(2)), KeyValue::from(2.0f64));
        assert_eq!(
            KeyValue::from(&json!({"b": 1, "a": 2})),
            KeyValue::from(&json!({"a": 2, "b": 1}))
        );
    }

    #[test]
    fn test_composite_keys_ignore_field_order() {
        let written: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": {"z": [{"d": 1, "c": "x\"y"}], "y": null}}"#)
                .unwrap();
        let reordered: serde_json::Value =
            serde_json::from_str(r#"{"a": {"y": null, "z": [{"c": "x\"y", "d": 1}]}, "b": 1}"#)
                .unwrap();

        assert_eq!(KeyValue::from(&written), KeyValue::from(&reordered));
        assert_eq!(
            KeyValue::from(&written),
            KeyValue::Composite(r#"{"a":{"y":null,"z":[{"c":"x\"y","d":1}]},"b":1}"#.to_string())
        );
        assert_ne!(
            KeyValue::from(&serde_json::json!([1, 2])),
            KeyValue::from(&serde_json::json!([2, 1]))
        );
    }

    #[test]
    fn test_option_and_text_are_distinct() {
        assert_eq!(KeyValue::from(None::<i32>), KeyValue::Null);
        assert_ne!(KeyValue::Null, KeyValue::Undefined);
        assert_ne!(KeyValue::from("1"), KeyValue::from(1));
    }

    #[test]
    fn test_serialization() {
        let keys = vec![KeyValue::from(3), KeyValue::from("x"), KeyValue::from(0.5)];
        let serialized = serde_json::to_string(&keys).unwrap();
        assert_eq!(serialized, r#"[3,"x",0.5]"#);
    }
}
