//! Option keys
//!
//! Enumerations and option values may be authored with integer or string keys
//! interchangeably, so every lookup tries the raw key first and then its
//! string form (see [`Key::coerced`]).

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value/enumeration key: an integer or a string
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    /// String form of the key
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Key::Int(n) => Cow::Owned(n.to_string()),
            Key::Text(s) => Cow::Borrowed(s),
        }
    }

    /// The string-coerced key, if it differs from the raw one
    pub fn coerced(&self) -> Option<Key> {
        match self {
            Key::Int(n) => Some(Key::Text(n.to_string())),
            Key::Text(_) => None,
        }
    }

    /// Key for a scalar JSON value
    ///
    /// Returns `None` for arrays and objects, which never address an
    /// enumeration entry. Integral floats (`1.0`) are integers; other floats
    /// and booleans only exist in string form.
    pub fn from_json(value: &Value) -> Option<Key> {
        match value {
            Value::String(s) => Some(Key::Text(s.clone())),
            Value::Number(n) => {
                let int = n.as_i64().or_else(|| n.as_f64().and_then(integral));
                Some(match int {
                    Some(i) => Key::Int(i),
                    None => Key::Text(n.to_string()),
                })
            }
            Value::Bool(b) => Some(Key::Text(b.to_string())),
            Value::Null => Some(Key::Text("null".to_string())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// JSON form of the key
    pub fn to_json(&self) -> Value {
        match self {
            Key::Int(n) => Value::from(*n),
            Key::Text(s) => Value::from(s.as_str()),
        }
    }
}

/// The integer an integral, in-range float denotes
fn integral(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{}", n),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Int(n.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coercion() {
        assert_eq!(Key::Int(1).coerced(), Some(Key::from("1")));
        assert_eq!(Key::from("1").coerced(), None);
        assert_eq!(Key::Int(42).as_text(), "42");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Key::from_json(&json!(3)), Some(Key::Int(3)));
        assert_eq!(Key::from_json(&json!("a")), Some(Key::from("a")));
        assert_eq!(Key::from_json(&json!(1.5)), Some(Key::from("1.5")));
        assert_eq!(Key::from_json(&json!(1.0)), Some(Key::Int(1)));
        assert_eq!(Key::from_json(&json!(-0.0)), Some(Key::Int(0)));
        assert!(matches!(Key::from_json(&json!(1e300)), Some(Key::Text(_))));
        assert_eq!(Key::from_json(&json!(true)), Some(Key::from("true")));
        assert_eq!(Key::from_json(&json!({"label": "x"})), None);
    }

    #[test]
    fn test_untagged_serde() {
        let keys: Vec<Key> = serde_json::from_value(json!([1, "two"])).unwrap();
        assert_eq!(keys, vec![Key::Int(1), Key::from("two")]);
        assert_eq!(serde_json::to_value(&keys).unwrap(), json!([1, "two"]));
    }
}
