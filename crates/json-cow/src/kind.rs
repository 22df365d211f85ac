//! Runtime kind of a wrapped JSON value.
//!
//! Consumers branching on "what kind of thing is this" observe the wrapped
//! target's kind through the proxy, never the wrapper itself. The
//! scalar/aggregate split decides what gets wrapped in a nested proxy: only
//! aggregates participate in copy-on-write tracking.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Scalars are returned by value from attribute reads, never proxied.
    pub fn is_scalar(self) -> bool {
        !self.is_aggregate()
    }

    pub fn is_aggregate(self) -> bool {
        matches!(self, ValueKind::Array | ValueKind::Object)
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_of_every_variant() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Bool);
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("s")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
    }

    #[test]
    fn only_aggregates_are_wrapped() {
        assert!(ValueKind::Null.is_scalar());
        assert!(ValueKind::String.is_scalar());
        assert!(ValueKind::Array.is_aggregate());
        assert!(ValueKind::Object.is_aggregate());
    }
}
