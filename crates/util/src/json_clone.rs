//! Deep duplication of JSON values.
//!
//! `duplicate` is the cost center of copy-on-write: it is what a proxy pays
//! exactly once when its first mutation arrives. Kept as an explicit
//! recursive walk so the duplication boundary stays visible at call sites.

use serde_json::{Map, Value};

/// Creates a deep duplicate of a JSON value.
///
/// Every nested object and array is rebuilt; the result shares no storage
/// with the input.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_cow_util::duplicate;
///
/// let original = json!({"a": {"x": 1}, "b": [1, 2]});
/// assert_eq!(duplicate(&original), original);
/// ```
pub fn duplicate(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(duplicate(item));
            }
            Value::Array(out)
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), duplicate(item));
            }
            Value::Object(out)
        }
    }
}
