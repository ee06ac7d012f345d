//! Read-mode presentation
//!
//! Resolves a stored field value through the value enumeration into a
//! [`DisplayNode`] for the visual layer. Decoration priority for a found
//! entry is: recognized status, then color badge, then plain text.
//!
//! # Example
//!
//! ```rust
//! use blinc_field::presenter::{present, DisplayNode, StatusKind};
//! use blinc_field::value_enum::{Descriptor, ValueEnum};
//! use serde_json::json;
//!
//! let value_enum = ValueEnum::new()
//!     .with(1, Descriptor::new("Open").status("Success"))
//!     .with(2, Descriptor::new("Closed"));
//!
//! assert_eq!(
//!     present(&json!(1), &value_enum),
//!     DisplayNode::status(StatusKind::Success, DisplayNode::text("Open")),
//! );
//! assert_eq!(present(&json!(3), &value_enum), DisplayNode::Raw(json!(3)));
//! ```

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::config::FieldConfig;
use crate::key::Key;
use crate::option::{json_text, SelectOption};
use crate::value_enum::{ValueEnum, ValueEnumItem};

/// Status tags with a dedicated visual treatment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Success,
    Error,
    Processing,
    Default,
    Warning,
}

impl StatusKind {
    /// Parse a status tag; accepts the PascalCase (`Success`) and lowercase
    /// (`success`) spellings only
    pub fn parse(tag: &str) -> Option<Self> {
        [
            StatusKind::Success,
            StatusKind::Error,
            StatusKind::Processing,
            StatusKind::Default,
            StatusKind::Warning,
        ]
        .into_iter()
        .find(|kind| {
            let name = kind.as_str();
            name == tag || name.to_ascii_lowercase() == tag
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Success => "Success",
            StatusKind::Error => "Error",
            StatusKind::Processing => "Processing",
            StatusKind::Default => "Default",
            StatusKind::Warning => "Warning",
        }
    }
}

/// Display tree produced for read mode
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayNode {
    /// Plain text
    Text(String),
    /// A value shown verbatim (no enumeration entry)
    Raw(Value),
    /// Text wrapped in a status treatment
    Status {
        status: StatusKind,
        child: Box<DisplayNode>,
    },
    /// Text wrapped in a generic color tag
    Badge { color: String, child: Box<DisplayNode> },
    /// Several values side by side
    Spaced(Vec<DisplayNode>),
}

impl Default for DisplayNode {
    fn default() -> Self {
        DisplayNode::Text(String::new())
    }
}

impl DisplayNode {
    pub fn text(text: impl Into<String>) -> Self {
        DisplayNode::Text(text.into())
    }

    pub fn status(status: StatusKind, child: DisplayNode) -> Self {
        DisplayNode::Status {
            status,
            child: Box::new(child),
        }
    }

    pub fn badge(color: impl Into<String>, child: DisplayNode) -> Self {
        DisplayNode::Badge {
            color: color.into(),
            child: Box::new(child),
        }
    }
}

/// Plain-text rendering; decorations are dropped, spaced nodes joined by a space
impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayNode::Text(s) => f.write_str(s),
            DisplayNode::Raw(Value::Null) => Ok(()),
            DisplayNode::Raw(value) => match json_text(value) {
                Some(text) => f.write_str(&text),
                None => write!(f, "{}", value),
            },
            DisplayNode::Status { child, .. } | DisplayNode::Badge { child, .. } => {
                write!(f, "{}", child)
            }
            DisplayNode::Spaced(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", node)?;
                }
                Ok(())
            }
        }
    }
}

/// Present a value (or each element of an array value) through `value_enum`
pub fn present(value: &Value, value_enum: &ValueEnum) -> DisplayNode {
    if let Value::Array(items) = value {
        return DisplayNode::Spaced(items.iter().map(|item| present(item, value_enum)).collect());
    }

    let found = Key::from_json(value).and_then(|key| value_enum.get(&key));
    match found {
        Some(ValueEnumItem::Descriptor(descriptor)) => {
            let status = descriptor.status.as_deref().and_then(StatusKind::parse);
            let color = descriptor.color.as_deref().filter(|c| !c.is_empty());
            let text = descriptor.label().map(DisplayNode::text);

            match (status, color, text) {
                (Some(status), _, text) => DisplayNode::status(status, text.unwrap_or_default()),
                (None, Some(color), text) => DisplayNode::badge(color, text.unwrap_or_default()),
                (None, None, Some(text)) => text,
                (None, None, None) => DisplayNode::Raw(descriptor.to_json()),
            }
        }
        Some(ValueEnumItem::Text(text)) => DisplayNode::text(text.as_str()),
        Some(ValueEnumItem::Empty) | None => fallback(value),
    }
}

/// The value's own `label` when truthy, else the value itself
fn fallback(value: &Value) -> DisplayNode {
    match value.get("label") {
        Some(label) if is_truthy(label) => match label {
            Value::String(s) => DisplayNode::text(s.as_str()),
            other => DisplayNode::Raw(other.clone()),
        },
        _ => DisplayNode::Raw(value.clone()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Present a field value in read mode
///
/// Uses the configured enumeration when there is one, otherwise an
/// enumeration derived from the field's resolved options.
pub fn present_field(value: &Value, config: &FieldConfig, options: &[SelectOption]) -> DisplayNode {
    let value_enum = match &config.value_enum {
        Some(value_enum) => Cow::Borrowed(value_enum),
        None => Cow::Owned(ValueEnum::from_options(options)),
    };
    present(value, &value_enum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_enum::{normalize, Descriptor};
    use serde_json::json;

    fn statuses() -> ValueEnum {
        ValueEnum::new()
            .with(1, Descriptor::new("Open").status("Success"))
            .with(2, Descriptor::new("Closed"))
    }

    #[test]
    fn test_status_decoration() {
        let node = present(&json!(1), &statuses());
        assert_eq!(node, DisplayNode::status(StatusKind::Success, DisplayNode::text("Open")));
        assert_eq!(node.to_string(), "Open");
    }

    #[test]
    fn test_plain_descriptor() {
        assert_eq!(present(&json!(2), &statuses()), DisplayNode::text("Closed"));
    }

    #[test]
    fn test_absent_value_verbatim() {
        assert_eq!(present(&json!(3), &statuses()), DisplayNode::Raw(json!(3)));
    }

    #[test]
    fn test_string_value_matches_int_key() {
        // Object-authored enumerations always have string keys
        let value_enum = normalize(json!({ "1": { "text": "One", "status": "error" } }));
        assert_eq!(
            present(&json!(1), &value_enum),
            DisplayNode::status(StatusKind::Error, DisplayNode::text("One"))
        );
    }

    #[test]
    fn test_integral_float_matches_string_key() {
        let value_enum = normalize(json!({ "1": "One" }));
        assert_eq!(present(&json!(1.0), &value_enum), DisplayNode::text("One"));
        assert_eq!(present(&json!(1.5), &value_enum), DisplayNode::Raw(json!(1.5)));
    }

    #[test]
    fn test_color_when_status_unrecognized() {
        let value_enum = ValueEnum::new().with(
            "x",
            Descriptor::new("Custom").status("Init").color("#52c41a"),
        );
        assert_eq!(
            present(&json!("x"), &value_enum),
            DisplayNode::badge("#52c41a", DisplayNode::text("Custom"))
        );
    }

    #[test]
    fn test_status_beats_color() {
        let value_enum =
            ValueEnum::new().with("w", Descriptor::new("Careful").status("Warning").color("red"));
        assert!(matches!(
            present(&json!("w"), &value_enum),
            DisplayNode::Status { status: StatusKind::Warning, .. }
        ));
    }

    #[test]
    fn test_descriptor_without_text_falls_back_to_raw() {
        let value_enum = ValueEnum::new().with("d", Descriptor::default().disabled());
        assert_eq!(
            present(&json!("d"), &value_enum),
            DisplayNode::Raw(json!({ "disabled": true }))
        );
    }

    #[test]
    fn test_label_fallback_for_objects() {
        let value = json!({ "label": "Picked", "value": 99 });
        assert_eq!(present(&value, &statuses()), DisplayNode::text("Picked"));
        let unlabeled = json!({ "value": 99 });
        assert_eq!(present(&unlabeled, &statuses()), DisplayNode::Raw(unlabeled.clone()));
    }

    #[test]
    fn test_array_values_keep_order() {
        let node = present(&json!([2, 1, 5]), &statuses());
        assert_eq!(
            node,
            DisplayNode::Spaced(vec![
                DisplayNode::text("Closed"),
                DisplayNode::status(StatusKind::Success, DisplayNode::text("Open")),
                DisplayNode::Raw(json!(5)),
            ])
        );
        assert_eq!(node.to_string(), "Closed Open 5");
    }

    #[test]
    fn test_present_field_uses_options_without_enum() {
        let config = FieldConfig::default();
        let options = vec![SelectOption::group("G", vec![SelectOption::new(7, "Seven")])];
        assert_eq!(present_field(&json!(7), &config, &options), DisplayNode::text("Seven"));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(StatusKind::parse("processing"), Some(StatusKind::Processing));
        assert_eq!(StatusKind::parse("Default"), Some(StatusKind::Default));
        assert_eq!(StatusKind::parse("Init"), None);
        assert_eq!(StatusKind::parse("SUCCESS"), None);
        assert_eq!(StatusKind::parse("sUcCeSs"), None);
        assert_eq!(StatusKind::parse("warning"), Some(StatusKind::Warning));
    }
}
