//! Field configuration
//!
//! A select field is configured with a [`FieldConfig`], either built in code
//! or loaded from TOML:
//!
//! ```toml
//! debounce_time = 300
//! cache_for_swr = true
//! field_key = "assignee"
//!
//! [params]
//! team = "core"
//!
//! [value_enum]
//! open = { text = "Open", status = "Success" }
//! closed = "Closed"
//!
//! [field_props]
//! filter_option = true
//! field_names = { label = "name", value = "id" }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::option::{list_from_json, FieldNames, SelectOption};
use crate::value_enum::{normalize, ValueEnum, ValueEnumSource};

/// Configuration of one select field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Static enumeration; seeds the options and drives read mode
    pub value_enum: Option<ValueEnum>,
    /// Debounce for keyword/params changes in milliseconds
    pub debounce_time: Option<u64>,
    /// Extra request parameters; any change triggers a new request
    pub params: Value,
    /// Explicit instance identifier (shares the request cache across fields)
    pub field_key: Option<String>,
    /// Keyword in effect at mount
    pub default_keyword: Option<String>,
    /// Trust cached responses and revalidate only on reconnect
    pub cache_for_swr: bool,
    /// Settings forwarded from the input control
    pub field_props: FieldProps,
}

/// Input control settings the resolver honors
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldProps")]
pub struct FieldProps {
    /// Explicit option list; takes precedence over the enumeration
    pub options: Option<Vec<SelectOption>>,
    /// `Some(false)` disables local keyword filtering
    pub filter_option: Option<bool>,
    /// Fallback debounce when the field-level one is unset
    pub debounce_time: Option<u64>,
    /// Property names for raw option objects
    pub field_names: FieldNames,
}

/// Serialized form of [`FieldProps`]; options are parsed with the field names
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawFieldProps {
    options: Option<Value>,
    filter_option: Option<bool>,
    debounce_time: Option<u64>,
    field_names: FieldNames,
}

impl TryFrom<RawFieldProps> for FieldProps {
    type Error = FetchError;

    fn try_from(raw: RawFieldProps) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            options: raw
                .options
                .map(|v| list_from_json(&v, &raw.field_names))
                .transpose()?,
            filter_option: raw.filter_option,
            debounce_time: raw.debounce_time,
            field_names: raw.field_names,
        })
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration file; `.json` files are parsed as JSON, anything
    /// else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        tracing::debug!("Loaded field config from {}", path.display());
        Ok(config)
    }

    /// Set the enumeration
    pub fn value_enum(mut self, source: impl Into<ValueEnumSource>) -> Self {
        self.value_enum = Some(normalize(source));
        self
    }

    /// Set the request parameters
    pub fn params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Set the debounce in milliseconds
    pub fn debounce_time(mut self, ms: u64) -> Self {
        self.debounce_time = Some(ms);
        self
    }

    pub fn cache_for_swr(mut self, enabled: bool) -> Self {
        self.cache_for_swr = enabled;
        self
    }

    pub fn field_key(mut self, key: impl Into<String>) -> Self {
        self.field_key = Some(key.into());
        self
    }

    pub fn default_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.default_keyword = Some(keyword.into());
        self
    }

    /// Set an explicit option list
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.field_props.options = Some(options);
        self
    }

    pub fn filter_option(mut self, enabled: bool) -> Self {
        self.field_props.filter_option = Some(enabled);
        self
    }

    /// Effective debounce: field level, then field props, then zero
    pub fn effective_debounce(&self) -> Duration {
        let ms = self
            .debounce_time
            .or(self.field_props.debounce_time)
            .unwrap_or(0);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::value_enum::ValueEnumItem;
    use serde_json::json;

    const SAMPLE: &str = r#"
debounce_time = 300
cache_for_swr = true
field_key = "assignee"

[params]
team = "core"

[value_enum]
open = { text = "Open", status = "Success" }
closed = "Closed"

[field_props]
filter_option = false
field_names = { label = "name", value = "id" }
options = [{ name = "Ada", id = 1 }, "plain"]
"#;

    #[test]
    fn test_parse_toml() {
        let config = FieldConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.effective_debounce(), Duration::from_millis(300));
        assert!(config.cache_for_swr);
        assert_eq!(config.field_key.as_deref(), Some("assignee"));
        assert_eq!(config.params, json!({ "team": "core" }));
        assert_eq!(config.field_props.filter_option, Some(false));

        let value_enum = config.value_enum.unwrap();
        let keys: Vec<String> = value_enum.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["open", "closed"]);
        assert_eq!(
            value_enum.get(&Key::from("closed")),
            Some(&ValueEnumItem::from("Closed"))
        );

        let options = config.field_props.options.unwrap();
        assert_eq!(options[0], SelectOption::new(1, "Ada"));
        assert_eq!(options[1], SelectOption::new("plain", "plain"));
    }

    #[test]
    fn test_defaults() {
        let config = FieldConfig::from_toml_str("").unwrap();
        assert_eq!(config, FieldConfig::default());
        assert_eq!(config.effective_debounce(), Duration::ZERO);
        assert!(!config.cache_for_swr);
        assert_eq!(config.params, Value::Null);
    }

    #[test]
    fn test_debounce_falls_back_to_field_props() {
        let config = FieldConfig::from_toml_str("[field_props]\ndebounce_time = 40").unwrap();
        assert_eq!(config.effective_debounce(), Duration::from_millis(40));
    }

    #[test]
    fn test_parse_json_keeps_enum_order() {
        let raw = r#"{
            "value_enum": { "z": "Last", "a": "First" },
            "field_props": { "options": ["x"] }
        }"#;
        let config = FieldConfig::from_json_str(raw).unwrap();
        let keys: Vec<String> = config
            .value_enum
            .unwrap()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(config.field_props.options, Some(vec![SelectOption::new("x", "x")]));
        assert!(matches!(
            FieldConfig::from_json_str("{"),
            Err(crate::error::FieldError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FieldConfig::load(Path::new("/nonexistent/field.toml")).unwrap_err();
        assert!(matches!(err, crate::error::FieldError::Io(_)));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(FieldConfig::from_toml_str("debounce_time = \"soon\"").is_err());
    }
}
