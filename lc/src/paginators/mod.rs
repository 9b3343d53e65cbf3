//! Ready-made handlers
//!
//! - [`ArrayPaginator`] filters, sorts, searches and pages an in-memory row
//!   set (or the rows of another handler)
//! - [`ApiPaginator`] maps the query onto a REST endpoint

mod api;
mod array;

pub use api::ApiPaginator;
pub use array::{ArrayPaginator, SEARCH_ENTRIES, compare_values};

use serde_json::Value;

/// Render a JSON scalar the way it appears in text (strings unquoted)
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(true)), "true");
    }
}
