//! Dotted-path access into JSON objects
//!
//! Field names such as `address.city` address nested objects. Missing or
//! non-object intermediate values are replaced by empty objects.

use serde_json::{Map, Value};

/// Ensure every parent object of `path` exists; the leaf is left untouched
pub fn create(target: &mut Value, path: &str) {
    let segments: Vec<&str> = path.split('.').collect();
    if let Some((_, parents)) = segments.split_last() {
        let mut cursor = target;
        for segment in parents {
            cursor = child_object(cursor, segment);
        }
    }
}

/// Set the value at `path`, creating parent objects as needed
pub fn set(target: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = target;
    for segment in parents {
        cursor = child_object(cursor, segment);
    }
    as_object(cursor).insert(leaf.to_string(), value);
}

/// Read the value at `path`
pub fn get<'a>(target: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(target, |cursor, segment| cursor.get(segment))
}

/// Recursively merge `source` into `target`; `source` wins on conflicts
///
/// Objects merge key by key. Arrays and scalars replace.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => deep_merge(existing, value),
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Loose truthiness: null, false, 0, "" and NaN are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

fn child_object<'a>(value: &'a mut Value, key: &str) -> &'a mut Value {
    let child = as_object(value)
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_builds_parents_only() {
        let mut data = json!({});
        create(&mut data, "address.city");
        assert_eq!(data, json!({"address": {}}));

        create(&mut data, "plain");
        assert_eq!(data, json!({"address": {}}));
    }

    #[test]
    fn test_set_and_get_nested() {
        let mut data = json!({"keep": 1});
        set(&mut data, "address.city", json!("Paris"));
        set(&mut data, "address.zip", json!("75001"));

        assert_eq!(data, json!({"keep": 1, "address": {"city": "Paris", "zip": "75001"}}));
        assert_eq!(get(&data, "address.city"), Some(&json!("Paris")));
        assert_eq!(get(&data, "address.street"), None);
        assert_eq!(get(&data, "keep.deeper"), None);
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut data = json!({"a": 5});
        set(&mut data, "a.b", json!(true));
        assert_eq!(data, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_deep_merge_source_wins() {
        let mut target = json!({"name": "", "range": {"from": 0, "to": 10}, "tags": [1, 2]});
        let source = json!({"name": "bob", "range": {"to": 99}, "tags": [3]});
        deep_merge(&mut target, &source);

        assert_eq!(target, json!({"name": "bob", "range": {"from": 0, "to": 99}, "tags": [3]}));
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
