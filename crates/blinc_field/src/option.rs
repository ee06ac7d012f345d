//! Selectable options
//!
//! [`SelectOption`] is the item type handed to the select input. Options may
//! nest: an option tagged [`OptionType::OptGroup`] that carries `children` or
//! `options` is a group, everything else is a leaf.
//!
//! Option lists arriving as JSON (request responses, config overrides) are
//! parsed with [`SelectOption::from_json`], which accepts bare strings as
//! `{label, value}` pairs and honors custom [`FieldNames`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::key::Key;

/// Option kind tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionType {
    /// A group header whose `children`/`options` are the grouped items
    OptGroup,
}

/// A selectable option (or option group)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct SelectOption {
    /// The value stored when selected
    pub value: Key,
    /// The display label (used for filtering and highlighting)
    pub label: String,
    /// Stable list key, usually the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Original enumeration text, when generated from an enumeration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl SelectOption {
    /// Create a leaf option with value and label
    pub fn new(value: impl Into<Key>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            key: None,
            text: None,
            disabled: None,
            option_type: None,
            children: None,
            options: None,
        }
    }

    /// Create an option group holding `children`
    pub fn group(label: impl Into<String>, children: Vec<SelectOption>) -> Self {
        let label = label.into();
        Self {
            option_type: Some(OptionType::OptGroup),
            children: Some(children),
            ..Self::new(label.clone(), label)
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = Some(true);
        self
    }

    /// Set the list key
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Whether this option is a group (tagged and carrying descendants)
    pub fn is_group(&self) -> bool {
        self.option_type == Some(OptionType::OptGroup)
            && (self.children.is_some() || self.options.is_some())
    }

    /// Direct descendants: `children` followed by `options`
    pub fn descendants(&self) -> impl Iterator<Item = &SelectOption> {
        self.children
            .iter()
            .flatten()
            .chain(self.options.iter().flatten())
    }

    /// Parse one option from JSON using the given field names
    pub fn from_json(value: &Value, names: &FieldNames) -> Result<Self, FetchError> {
        match value {
            Value::String(s) => Ok(Self::new(s.as_str(), s.as_str())),
            Value::Number(_) | Value::Bool(_) => {
                let label = json_text(value).unwrap_or_default();
                let key = Key::from_json(value).unwrap_or_else(|| Key::Text(label.clone()));
                Ok(Self::new(key, label))
            }
            Value::Object(map) => Self::from_object(map, names),
            Value::Null | Value::Array(_) => Err(FetchError::Decode(format!(
                "expected an option object or string, got {}",
                value
            ))),
        }
    }

    fn from_object(map: &Map<String, Value>, names: &FieldNames) -> Result<Self, FetchError> {
        let label = map
            .get(&names.label)
            .and_then(json_text)
            .unwrap_or_default();

        // Group headers frequently omit a value; they are addressed by label
        let value = map
            .get(&names.value)
            .and_then(Key::from_json)
            .unwrap_or_else(|| Key::Text(label.clone()));

        let option_type = match map.get("optionType") {
            Some(Value::String(s)) if s == "optGroup" => Some(OptionType::OptGroup),
            _ => None,
        };

        Ok(Self {
            value,
            label,
            key: map.get("key").and_then(Key::from_json),
            text: map.get("text").and_then(json_text),
            disabled: map.get("disabled").and_then(Value::as_bool),
            option_type,
            children: map
                .get("children")
                .map(|v| list_from_json(v, names))
                .transpose()?,
            options: map
                .get(&names.options)
                .map(|v| list_from_json(v, names))
                .transpose()?,
        })
    }
}

impl TryFrom<Value> for SelectOption {
    type Error = FetchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value, &FieldNames::default())
    }
}

/// Parse an option list from a JSON array
pub fn list_from_json(value: &Value, names: &FieldNames) -> Result<Vec<SelectOption>, FetchError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| SelectOption::from_json(item, names))
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::Decode(format!(
            "expected an option array, got {}",
            other
        ))),
    }
}

/// Property names used to read label/value/options from raw option objects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub label: String,
    pub value: String,
    pub options: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            label: "label".to_string(),
            value: "value".to_string(),
            options: "options".to_string(),
        }
    }
}

/// Display text of a scalar JSON value; `None` for null, arrays and objects
pub(crate) fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_strings() {
        let raw = json!(["a", { "label": "B", "value": "b" }]);
        let list = list_from_json(&raw, &FieldNames::default()).unwrap();
        assert_eq!(list[0], SelectOption::new("a", "a"));
        assert_eq!(list[1], SelectOption::new("b", "B"));
    }

    #[test]
    fn test_group_detection() {
        let group = SelectOption::group("Fruit", vec![SelectOption::new("a", "Apple")]);
        assert!(group.is_group());
        assert_eq!(group.descendants().count(), 1);

        // Tagged but without descendants is a leaf
        let mut tagged = SelectOption::new("x", "X");
        tagged.option_type = Some(OptionType::OptGroup);
        assert!(!tagged.is_group());

        // Descendants without the tag do not make a group
        let mut untagged = SelectOption::new("y", "Y");
        untagged.children = Some(vec![SelectOption::new("z", "Z")]);
        assert!(!untagged.is_group());
    }

    #[test]
    fn test_custom_field_names() {
        let names = FieldNames {
            label: "name".into(),
            value: "id".into(),
            options: "items".into(),
        };
        let raw = json!({
            "name": "Team",
            "optionType": "optGroup",
            "items": [{"name": "Ada", "id": 7}]
        });
        let option = SelectOption::from_json(&raw, &names).unwrap();
        assert!(option.is_group());
        assert_eq!(option.value, Key::from("Team"));
        assert_eq!(option.options.unwrap()[0], SelectOption::new(7, "Ada"));
    }

    #[test]
    fn test_deserialize_via_serde() {
        let option: SelectOption =
            serde_json::from_value(json!({"label": 3, "value": 3, "disabled": true})).unwrap();
        assert_eq!(option, SelectOption::new(3, "3").disabled());
        assert!(serde_json::from_value::<SelectOption>(json!(null)).is_err());
    }
}
