//! Deep equality comparison for JSON values.
//!
//! Used by the forwarding surface (`Eq`/`Ne`/`Contains`) and by tests that
//! check a proxied target against a pre-proxy snapshot.

use serde_json::Value;

/// Performs a deep equality check between two JSON values.
///
/// Objects compare key-by-key regardless of insertion order; arrays compare
/// element-by-element in order. Values of different kinds are never equal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_cow_util::deep_equal;
///
/// assert!(deep_equal(&json!({"a": [1, 2]}), &json!({"a": [1, 2]})));
/// assert!(!deep_equal(&json!({"a": 1}), &json!({"a": "1"})));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => false,
    }
}
