//! Closed canonical value type and deep key sorting

use serde_json::Value as JsonValue;

/// A parameter value in canonical form.
///
/// Maps keep an explicit entry order so that canonicalization is a pure
/// transformation with an observable result; sequences are ordered and are
/// never reordered by canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Leaf value, already rendered to its wire string
    Scalar(String),
    /// Ordered list of values, position is meaningful
    Sequence(Vec<Value>),
    /// Key/value entries in their current (possibly unsorted) order
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Convenience constructor for scalar leaves
    pub fn scalar(value: impl Into<String>) -> Self {
        Value::Scalar(value.into())
    }

    /// True for a map with no entries
    pub fn is_empty_map(&self) -> bool {
        matches!(self, Value::Map(entries) if entries.is_empty())
    }
}

/// JSON values convert with JavaScript string-interpolation semantics:
/// `null` becomes the literal "null", booleans and numbers render via
/// their display form. The remote verifier was written against an
/// implementation with exactly these semantics.
impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Scalar("null".to_string()),
            JsonValue::Bool(b) => Value::Scalar(b.to_string()),
            JsonValue::Number(n) => Value::Scalar(n.to_string()),
            JsonValue::String(s) => Value::Scalar(s.clone()),
            JsonValue::Array(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Map(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect())
            }
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}

/// Recursively sort map keys by code-point order at every nesting level.
///
/// Sequence elements are canonicalized individually but keep their
/// positions. Scalars pass through unchanged. Pure; the input is not
/// mutated.
pub fn sort_keys_deep(value: &Value) -> Value {
    match value {
        Value::Scalar(s) => Value::Scalar(s.clone()),
        Value::Sequence(items) => Value::Sequence(items.iter().map(sort_keys_deep).collect()),
        Value::Map(entries) => {
            let mut sorted: Vec<(String, Value)> = entries
                .iter()
                .map(|(key, val)| (key.clone(), sort_keys_deep(val)))
                .collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Map(sorted)
        }
    }
}
