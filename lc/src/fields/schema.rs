//! Field descriptors for filter forms

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors from loading a field schema file
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read field schema {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse field schema {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Field kinds known to filter forms
///
/// Layout kinds group other fields and carry no value of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    // Layouts
    #[default]
    Group,
    Paper,
    Outline,
    Expansion,
    Fragment,
    Div,
    #[serde(rename = "box")]
    BoxLayout,
    Tabs,
    Hero,
    Center,
    Stretch,
    Condition,
    Line,

    // Values
    Checkbox,
    Radio,
    Text,
    Switch,
    Progress,
    Slider,
    Combo,
    Items,
    Rating,
    Typography,
    Date,
    Time,
    File,
    Choose,
    Component,
    Complete,
    Init,
    YesNo,
    Dict,
    Tree,

    // Decorations without a value
    Button,
    Icon,
}

impl FieldType {
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            Self::Group
                | Self::Paper
                | Self::Outline
                | Self::Expansion
                | Self::Fragment
                | Self::Div
                | Self::BoxLayout
                | Self::Tabs
                | Self::Hero
                | Self::Center
                | Self::Stretch
                | Self::Condition
                | Self::Line
        )
    }

    /// Empty value for this kind, or `None` if the kind holds no value
    pub fn initial_value(&self) -> Option<Value> {
        let value = match self {
            Self::Checkbox | Self::Switch => Value::Bool(false),
            Self::Text | Self::Typography | Self::Date | Self::Time | Self::Complete => Value::String(String::new()),
            Self::Progress => Value::from(1.0),
            Self::Slider => Value::from(0),
            Self::Rating => Value::from(3),
            Self::Radio
            | Self::Combo
            | Self::Items
            | Self::File
            | Self::Choose
            | Self::Component
            | Self::Init
            | Self::YesNo
            | Self::Dict
            | Self::Tree => Value::Null,
            _ => return None,
        };
        Some(value)
    }
}

/// Default value of a field: a literal or computed from the payload
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Compute(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn resolve(&self, payload: &Value) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Compute(compute) => compute(payload),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Literal)
    }
}

/// Visibility of a field: a flag or computed from the payload
#[derive(Clone)]
pub enum Hidden {
    Flag(bool),
    Compute(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Hidden {
    pub fn is_hidden(&self, payload: &Value) -> bool {
        match self {
            Self::Flag(hidden) => *hidden,
            Self::Compute(compute) => compute(payload),
        }
    }
}

impl fmt::Debug for Hidden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(hidden) => f.debug_tuple("Flag").field(hidden).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Hidden {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Self::Flag)
    }
}

/// Node of a filter form schema
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Dotted path of the value in filter data; layouts usually have none
    pub name: Option<String>,

    pub default_value: Option<DefaultValue>,

    pub hidden: Option<Hidden>,

    /// Nested fields of a layout
    pub fields: Vec<FieldDescriptor>,

    /// Single nested field of a wrapping layout
    pub child: Option<Box<FieldDescriptor>>,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Default::default()
        }
    }

    /// Value field bound to `name`
    pub fn named(field_type: FieldType, name: impl Into<String>) -> Self {
        Self {
            field_type,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Layout containing `fields`
    pub fn group(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(DefaultValue::Literal(value.into()));
        self
    }

    pub fn with_default_fn(mut self, compute: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.default_value = Some(DefaultValue::Compute(Arc::new(compute)));
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(Hidden::Flag(hidden));
        self
    }

    pub fn hidden_when(mut self, compute: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.hidden = Some(Hidden::Compute(Arc::new(compute)));
        self
    }

    pub fn with_child(mut self, child: FieldDescriptor) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn is_hidden(&self, payload: &Value) -> bool {
        self.hidden.as_ref().is_some_and(|hidden| hidden.is_hidden(payload))
    }
}

/// Flatten a schema depth-first, parents before their children
pub fn deep_flat(fields: &[FieldDescriptor]) -> Vec<&FieldDescriptor> {
    fn visit<'a>(field: &'a FieldDescriptor, out: &mut Vec<&'a FieldDescriptor>) {
        out.push(field);
        for nested in &field.fields {
            visit(nested, out);
        }
        if let Some(child) = &field.child {
            visit(child, out);
        }
    }

    let mut out = Vec::new();
    for field in fields {
        visit(field, &mut out);
    }
    out
}

/// Load a field schema from a YAML (or JSON) file
pub fn load_fields(path: impl AsRef<Path>) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "load_fields: called");
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| SchemaError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn leaf() -> FieldDescriptor {
        FieldDescriptor::new(FieldType::Group)
    }

    #[test]
    fn test_deep_flat_counts_every_node() {
        // group(7 nodes) + paper with child(2 nodes)
        let fields = vec![
            FieldDescriptor::group(vec![leaf(), leaf(), FieldDescriptor::group(vec![leaf(), leaf()]), leaf()]),
            FieldDescriptor::new(FieldType::Paper).with_child(leaf()),
        ];
        assert_eq!(deep_flat(&fields).len(), 9);
        assert_eq!(deep_flat(&[leaf(), leaf(), leaf()]).len(), 3);
        assert!(deep_flat(&[]).is_empty());
    }

    #[test]
    fn test_deep_flat_order_is_preorder() {
        let fields = vec![
            FieldDescriptor::group(vec![
                FieldDescriptor::named(FieldType::Text, "a"),
                FieldDescriptor::named(FieldType::Text, "b"),
            ]),
            FieldDescriptor::named(FieldType::Text, "c"),
        ];
        let names: Vec<_> = deep_flat(&fields).iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec![None, Some("a".into()), Some("b".into()), Some("c".into())]);
    }

    #[test]
    fn test_initial_values() {
        assert_eq!(FieldType::Text.initial_value(), Some(json!("")));
        assert_eq!(FieldType::Checkbox.initial_value(), Some(json!(false)));
        assert_eq!(FieldType::Rating.initial_value(), Some(json!(3)));
        assert_eq!(FieldType::Progress.initial_value(), Some(json!(1.0)));
        assert_eq!(FieldType::Combo.initial_value(), Some(Value::Null));
        assert_eq!(FieldType::Group.initial_value(), None);
        assert_eq!(FieldType::Button.initial_value(), None);
        assert!(FieldType::Line.is_layout());
        assert!(!FieldType::Text.is_layout());
    }

    #[test]
    fn test_hidden_compute_reads_payload() {
        let field = FieldDescriptor::named(FieldType::Text, "secret").hidden_when(|payload| payload["guest"] == true);
        assert!(field.is_hidden(&json!({"guest": true})));
        assert!(!field.is_hidden(&json!({})));
    }

    #[test]
    fn test_load_fields_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
- type: group
  fields:
    - type: text
      name: name
    - type: yes-no
      name: active
      defaultValue: true
    - type: text
      name: internal
      hidden: true
- type: paper
  child:
    type: slider
    name: range.min
"#
        )
        .unwrap();

        let fields = load_fields(file.path()).unwrap();
        let flat = deep_flat(&fields);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[2].field_type, FieldType::YesNo);
        assert!(matches!(flat[2].default_value, Some(DefaultValue::Literal(Value::Bool(true)))));
        assert!(flat[3].is_hidden(&Value::Null));
        assert_eq!(flat[5].name.as_deref(), Some("range.min"));
    }

    #[test]
    fn test_load_fields_missing_file() {
        let err = load_fields("/nonexistent/fields.yml").unwrap_err();
        assert!(matches!(err, SchemaError::Read { .. }));
    }
}
