//! Row identity and the generic JSON row

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable unique row identifier
///
/// Callers key selection sets, caches and de-duplication on this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Num(i64),
    Str(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        match id {
            RowId::Num(n) => Value::from(n),
            RowId::Str(s) => Value::String(s),
        }
    }
}

/// Any record a list can display
pub trait RowData: Clone + Send + Sync + 'static {
    /// Stable unique id of this row
    fn id(&self) -> RowId;
}

/// Row with an id and arbitrary JSON fields
///
/// Used by the built-in paginators and the `lc` binary, which know nothing
/// about the integrator's row types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRow {
    pub id: RowId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JsonRow {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Look up a field by name; `id` resolves to the row id
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(self.id.clone().into());
        }
        self.fields.get(name).cloned()
    }
}

impl RowData for JsonRow {
    fn id(&self) -> RowId {
        self.id.clone()
    }
}
