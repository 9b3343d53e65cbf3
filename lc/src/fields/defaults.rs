//! Default filter values computed from a field schema

use serde_json::{Map, Value};
use tracing::debug;

use super::path::{create, deep_merge, get, is_truthy, set};
use super::schema::{FieldDescriptor, deep_flat};

/// Compute default filter data for a schema
///
/// Fields are visited depth-first. A named, visible field takes its
/// `default_value` (literal or computed from `payload`); otherwise a truthy
/// value already written under the same name is kept, else the type's empty
/// value is used. Hidden fields get their parent objects but no value.
pub fn resolve_defaults(fields: &[FieldDescriptor], payload: &Value) -> Value {
    let mut data = Value::Object(Map::new());
    for field in deep_flat(fields) {
        let Some(name) = field.name.as_deref().filter(|name| !name.is_empty()) else {
            continue;
        };
        create(&mut data, name);
        if field.is_hidden(payload) {
            continue;
        }
        let value = match &field.default_value {
            Some(default) => Some(default.resolve(payload)),
            None => get(&data, name)
                .filter(|existing| is_truthy(existing))
                .cloned()
                .or_else(|| field.field_type.initial_value()),
        };
        match value {
            Some(value) => set(&mut data, name, value),
            None => debug!(name, field_type = ?field.field_type, "resolve_defaults: field type has no initial value"),
        }
    }
    data
}

/// Defaults with caller-supplied filter data merged over them
///
/// Caller keys win; keys the caller did not mention keep their defaults.
pub fn resolve_initial_filter_data(fields: &[FieldDescriptor], payload: &Value, overrides: &Value) -> Value {
    let mut data = resolve_defaults(fields, payload);
    if overrides.is_object() {
        deep_merge(&mut data, overrides);
    }
    data
}
