//! Deterministic query-string flattening

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::value::{sort_keys_deep, Value};

/// Characters left unescaped by JavaScript's `encodeURIComponent`:
/// alphanumerics plus `- _ . ! ~ * ' ( )`.
const URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-escape a string with `encodeURIComponent` semantics.
///
/// Used for query-string keys and for the HMAC key derivation step, both
/// of which must match the remote verifier's JavaScript escaping exactly.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT_SET).to_string()
}

/// Serialize a canonicalized value to `key=value&key=value…` form.
///
/// The input is deep-sorted first, so the output is independent of the
/// caller's key order. Keys are percent-escaped; scalar values are emitted
/// verbatim. A sequence emits one `key=element` pair per element, in
/// sequence order. A nested map is flattened with its parent key dropped:
/// the nested entries are spliced in at the parent's position under their
/// own names. That flattening can collide field names between nesting
/// levels; the remote verifier does the same, so it stays.
///
/// `None` (and an empty map) serialize to the empty string.
pub fn to_query_string(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let canonical = sort_keys_deep(value);

    match &canonical {
        Value::Scalar(s) => s.clone(),
        _ => {
            let mut parts: Vec<String> = Vec::new();
            match &canonical {
                Value::Map(entries) => {
                    for (key, val) in entries {
                        emit_entry(key, val, &mut parts);
                    }
                }
                Value::Sequence(items) => {
                    for item in items {
                        emit_value(item, &mut parts);
                    }
                }
                Value::Scalar(_) => unreachable!(),
            }
            parts.join("&")
        }
    }
}

/// Emit one `key=…` unit; sequences repeat the key, maps drop it
fn emit_entry(key: &str, value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::Scalar(s) => parts.push(format!("{}={}", encode_uri_component(key), s)),
        Value::Sequence(items) => {
            for item in items {
                emit_entry(key, item, parts);
            }
        }
        Value::Map(entries) => {
            for (nested_key, nested_val) in entries {
                emit_entry(nested_key, nested_val, parts);
            }
        }
    }
}

/// Emit a keyless element (top-level sequence member)
fn emit_value(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::Scalar(s) => parts.push(s.clone()),
        Value::Sequence(items) => {
            for item in items {
                emit_value(item, parts);
            }
        }
        Value::Map(entries) => {
            for (key, val) in entries {
                emit_entry(key, val, parts);
            }
        }
    }
}
