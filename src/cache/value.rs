//! Stored Value Module
//!
//! Values are stored as JSON. Reading a scalar back is a single explicit
//! conversion from the decoded [`serde_json::Value`].

use serde_json::Value;

use crate::error::{CacheError, Result};

/// Names the JSON shape of a value for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads a stored value as a signed 64-bit integer.
///
/// Any integer width is accepted as long as it fits; floats and unsigned values
/// above `i64::MAX` are rejected.
pub fn to_i64(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) if n.is_u64() => n.as_i64().ok_or_else(|| CacheError::TypeMismatch {
            key: key.to_string(),
            expected: "i64",
            found: "u64 above i64::MAX",
        }),
        Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(key, "i64", value)),
        _ => Err(mismatch(key, "i64", value)),
    }
}

/// Reads a stored value as a string.
pub fn to_string(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(key, "string", &other)),
    }
}

fn mismatch(key: &str, expected: &'static str, value: &Value) -> CacheError {
    CacheError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: kind_of(value),
    }
}
