//! Value enumerations
//!
//! A value enumeration maps option values to their rendering metadata and
//! drives both the generated option list and read-mode decoration. Sources
//! arrive either as an already-built [`ValueEnum`] or as a plain JSON object;
//! [`normalize`] turns both into the one canonical ordered mapping so nothing
//! downstream has to branch on the representation.
//!
//! # Example
//!
//! ```rust
//! use blinc_field::value_enum::{normalize, to_option_list};
//! use serde_json::json;
//!
//! let source = json!({
//!     "open": { "text": "Open", "status": "Success" },
//!     "closed": "Closed",
//! });
//! let value_enum = normalize(source);
//! let options = to_option_list(&value_enum);
//! assert_eq!(options[0].label, "Open");
//! assert_eq!(options[1].label, "Closed");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::key::Key;
use crate::option::{json_text, SelectOption};

/// Rendering metadata for one enumeration entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Descriptor {
    /// Display text
    pub text: Option<String>,
    /// Status tag (`Success`, `Error`, `Processing`, `Default`, `Warning`)
    pub status: Option<String>,
    /// Badge color, used when no recognized status is set
    pub color: Option<String>,
    pub disabled: Option<bool>,
}

impl Descriptor {
    /// Descriptor with display text only
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Set the status tag
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the badge color
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Mark the generated option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = Some(true);
        self
    }

    /// Display text, if present and non-empty
    pub fn label(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let string = |name: &str| map.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            text: map.get("text").and_then(json_text),
            status: string("status"),
            color: string("color"),
            disabled: map.get("disabled").and_then(Value::as_bool),
        }
    }

    /// JSON form of the descriptor
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(text) = &self.text {
            map.insert("text".into(), Value::from(text.as_str()));
        }
        if let Some(status) = &self.status {
            map.insert("status".into(), Value::from(status.as_str()));
        }
        if let Some(color) = &self.color {
            map.insert("color".into(), Value::from(color.as_str()));
        }
        if let Some(disabled) = self.disabled {
            map.insert("disabled".into(), Value::from(disabled));
        }
        Value::Object(map)
    }
}

/// What one enumeration key maps to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueEnumItem {
    /// A `{ text, status, color, disabled }` record
    Descriptor(Descriptor),
    /// A bare display value
    Text(String),
    /// A falsy entry (`null`, `false`, `""`, `0`); produces no option
    Empty,
}

impl ValueEnumItem {
    /// Classify a raw JSON descriptor. Never fails.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => ValueEnumItem::Empty,
            Value::String(s) if s.is_empty() => ValueEnumItem::Empty,
            Value::Number(n) if n.as_f64() == Some(0.0) => ValueEnumItem::Empty,
            Value::Object(map) => ValueEnumItem::Descriptor(Descriptor::from_object(map)),
            Value::Array(_) => ValueEnumItem::Text(value.to_string()),
            scalar => ValueEnumItem::Text(json_text(scalar).unwrap_or_default()),
        }
    }

    /// JSON form of the item
    pub fn to_json(&self) -> Value {
        match self {
            ValueEnumItem::Descriptor(d) => d.to_json(),
            ValueEnumItem::Text(s) => Value::from(s.as_str()),
            ValueEnumItem::Empty => Value::Null,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ValueEnumItem::Empty)
    }

    /// Best-effort display text: descriptor text, bare text, or the raw
    /// descriptor rendered as JSON
    pub fn display_text(&self) -> String {
        match self {
            ValueEnumItem::Descriptor(d) => match d.label() {
                Some(text) => text.to_string(),
                None => d.to_json().to_string(),
            },
            ValueEnumItem::Text(s) => s.clone(),
            ValueEnumItem::Empty => String::new(),
        }
    }
}

impl From<Descriptor> for ValueEnumItem {
    fn from(descriptor: Descriptor) -> Self {
        ValueEnumItem::Descriptor(descriptor)
    }
}

impl From<&str> for ValueEnumItem {
    fn from(text: &str) -> Self {
        ValueEnumItem::Text(text.to_string())
    }
}

/// Canonical ordered enumeration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ValueEnum {
    entries: IndexMap<Key, ValueEnumItem>,
}

impl ValueEnum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; re-inserting a key overwrites it in place
    pub fn insert(&mut self, key: impl Into<Key>, item: impl Into<ValueEnumItem>) {
        self.entries.insert(key.into(), item.into());
    }

    /// Builder form of [`ValueEnum::insert`]
    pub fn with(mut self, key: impl Into<Key>, item: impl Into<ValueEnumItem>) -> Self {
        self.insert(key, item);
        self
    }

    /// Look up by the raw key, then by its string form
    pub fn get(&self, key: &Key) -> Option<&ValueEnumItem> {
        self.entries
            .get(key)
            .or_else(|| key.coerced().and_then(|k| self.entries.get(&k)))
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &ValueEnumItem)> {
        self.entries.iter()
    }

    /// Enumeration mapping every option value (recursively) to its label
    ///
    /// Used for read mode when a field has resolved options but no explicit
    /// enumeration.
    pub fn from_options(options: &[SelectOption]) -> Self {
        fn walk(options: &[SelectOption], out: &mut ValueEnum) {
            for option in options {
                let item = if option.label.is_empty() {
                    ValueEnumItem::Empty
                } else {
                    ValueEnumItem::Text(option.label.clone())
                };
                out.insert(option.value.clone(), item);
                for nested in [&option.children, &option.options].into_iter().flatten() {
                    walk(nested, out);
                }
            }
        }

        let mut value_enum = ValueEnum::new();
        walk(options, &mut value_enum);
        value_enum
    }

    /// Option list with `key` set to each value, for seeding a select input
    pub fn to_field_options(&self) -> Vec<SelectOption> {
        to_option_list(self)
            .into_iter()
            .map(|mut option| {
                option.key = Some(option.value.clone());
                option.text = None;
                option
            })
            .collect()
    }
}

/// Order-sensitive structural equality (insertion order drives option order)
impl PartialEq for ValueEnum {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for ValueEnum {}

impl From<Map<String, Value>> for ValueEnum {
    fn from(map: Map<String, Value>) -> Self {
        normalize(ValueEnumSource::Object(map))
    }
}

impl From<ValueEnum> for Map<String, Value> {
    fn from(value_enum: ValueEnum) -> Self {
        value_enum
            .entries
            .iter()
            .map(|(key, item)| (key.to_string(), item.to_json()))
            .collect()
    }
}

impl<K: Into<Key>, V: Into<ValueEnumItem>> FromIterator<(K, V)> for ValueEnum {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut value_enum = ValueEnum::new();
        for (key, item) in iter {
            value_enum.insert(key, item);
        }
        value_enum
    }
}

/// An enumeration in either accepted representation
#[derive(Clone, Debug)]
pub enum ValueEnumSource {
    /// Already canonical
    Map(ValueEnum),
    /// Plain object, entries in declaration order
    Object(Map<String, Value>),
}

impl From<ValueEnum> for ValueEnumSource {
    fn from(value_enum: ValueEnum) -> Self {
        ValueEnumSource::Map(value_enum)
    }
}

impl From<Map<String, Value>> for ValueEnumSource {
    fn from(map: Map<String, Value>) -> Self {
        ValueEnumSource::Object(map)
    }
}

impl From<Value> for ValueEnumSource {
    /// Non-object values normalize to an empty enumeration
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ValueEnumSource::Object(map),
            _ => ValueEnumSource::Object(Map::new()),
        }
    }
}

/// Convert any enumeration source into the canonical mapping
///
/// A [`ValueEnumSource::Map`] is returned as-is.
pub fn normalize(source: impl Into<ValueEnumSource>) -> ValueEnum {
    match source.into() {
        ValueEnumSource::Map(value_enum) => value_enum,
        ValueEnumSource::Object(map) => ValueEnum {
            entries: map
                .iter()
                .map(|(key, value)| (Key::Text(key.clone()), ValueEnumItem::from_json(value)))
                .collect(),
        },
    }
}

/// Flatten an enumeration into options, in enumeration order
///
/// Falsy entries are skipped; descriptors without text fall back to their raw
/// rendering as label.
pub fn to_option_list(value_enum: &ValueEnum) -> Vec<SelectOption> {
    value_enum
        .iter()
        .filter_map(|(key, _)| {
            let item = value_enum.get(key)?;
            match item {
                ValueEnumItem::Empty => None,
                ValueEnumItem::Descriptor(descriptor) => match descriptor.label() {
                    Some(text) => Some(SelectOption {
                        text: Some(text.to_string()),
                        disabled: descriptor.disabled,
                        ..SelectOption::new(key.clone(), text)
                    }),
                    None => Some(SelectOption::new(key.clone(), item.display_text())),
                },
                ValueEnumItem::Text(text) => Some(SelectOption::new(key.clone(), text.as_str())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ValueEnum {
        normalize(json!({
            "b": { "text": "Bravo", "disabled": true },
            "a": "Alpha",
            "z": null,
            "n": 0,
            "c": { "status": "Success" },
        }))
    }

    #[test]
    fn test_normalize_preserves_declaration_order() {
        let keys: Vec<String> = sample().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "a", "z", "n", "c"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = sample();
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_option_list_skips_falsy_entries() {
        let value_enum = sample();
        let options = to_option_list(&value_enum);
        assert!(options.len() <= value_enum.len());
        assert_eq!(options.len(), 3);

        assert_eq!(options[0].label, "Bravo");
        assert_eq!(options[0].text.as_deref(), Some("Bravo"));
        assert_eq!(options[0].disabled, Some(true));
        assert_eq!(options[1], SelectOption::new("a", "Alpha"));
        // Descriptor without text degrades to its raw rendering
        assert_eq!(options[2].label, r#"{"status":"Success"}"#);
    }

    #[test]
    fn test_option_list_len_equals_when_nothing_falsy() {
        let value_enum = ValueEnum::new()
            .with(1, Descriptor::new("One"))
            .with(2, "Two");
        assert_eq!(to_option_list(&value_enum).len(), value_enum.len());
    }

    #[test]
    fn test_lookup_falls_back_to_string_key() {
        let value_enum = normalize(json!({ "1": "One" }));
        assert_eq!(value_enum.get(&Key::Int(1)), Some(&ValueEnumItem::from("One")));
        assert!(value_enum.get(&Key::Int(2)).is_none());
    }

    #[test]
    fn test_reinsert_overwrites_in_place() {
        let mut value_enum = ValueEnum::new().with("a", "A").with("b", "B");
        value_enum.insert("a", "A2");
        let labels: Vec<String> = to_option_list(&value_enum)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["A2", "B"]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab = ValueEnum::new().with("a", "A").with("b", "B");
        let ba = ValueEnum::new().with("b", "B").with("a", "A");
        assert_ne!(ab, ba);
        assert_eq!(ab, ValueEnum::new().with("a", "A").with("b", "B"));
    }

    #[test]
    fn test_field_options_carry_key() {
        let value_enum = ValueEnum::new().with(1, Descriptor::new("One"));
        let options = value_enum.to_field_options();
        assert_eq!(options[0].key, Some(Key::Int(1)));
        assert_eq!(options[0].text, None);
    }

    #[test]
    fn test_from_options_walks_groups() {
        let options = vec![
            SelectOption::new("x", "X"),
            SelectOption::group("G", vec![SelectOption::new("y", "Y")]),
        ];
        let value_enum = ValueEnum::from_options(&options);
        assert_eq!(value_enum.get(&Key::from("y")), Some(&ValueEnumItem::from("Y")));
        assert_eq!(value_enum.len(), 3);
    }

    #[test]
    fn test_serde_round_trip_through_object() {
        let value_enum: ValueEnum =
            serde_json::from_value(json!({ "open": { "text": "Open", "color": "blue" } })).unwrap();
        let item = value_enum.get(&Key::from("open")).unwrap();
        assert_eq!(
            item,
            &ValueEnumItem::Descriptor(Descriptor::new("Open").color("blue"))
        );
    }
}
