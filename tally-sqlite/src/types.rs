//! Type conversion utilities for SQLite.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rusqlite::types::{Value, ValueRef};
use serde_json::Value as JsonValue;

/// Convert a JSON parameter to a SQLite value.
///
/// Arrays and objects are bound as their JSON text.
pub fn json_to_sqlite(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(value.to_string()),
    }
}

/// Convert a SQLite ValueRef to a JSON Value.
pub fn from_sqlite_value(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::String(STANDARD.encode(bytes)),
        },
    }
}

/// Get a JSON value from a row at the given column index.
pub fn get_value_at_index(row: &rusqlite::Row<'_>, index: usize) -> JsonValue {
    row.get_ref(index)
        .map(from_sqlite_value)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_sqlite() {
        assert!(matches!(json_to_sqlite(&JsonValue::Null), Value::Null));
        assert!(matches!(json_to_sqlite(&json!(true)), Value::Integer(1)));
        assert!(matches!(json_to_sqlite(&json!(42)), Value::Integer(42)));
        assert!(matches!(json_to_sqlite(&json!("pending")), Value::Text(s) if s == "pending"));
        assert!(matches!(json_to_sqlite(&json!([1, 2])), Value::Text(s) if s == "[1,2]"));

        match json_to_sqlite(&json!(1.5)) {
            Value::Real(f) => assert!((f - 1.5).abs() < f64::EPSILON),
            other => panic!("Expected Real, got {other:?}"),
        }
    }

    #[test]
    fn test_from_sqlite_value() {
        assert_eq!(from_sqlite_value(ValueRef::Null), JsonValue::Null);
        assert_eq!(from_sqlite_value(ValueRef::Integer(42)), json!(42));
        assert_eq!(from_sqlite_value(ValueRef::Text(b"hello")), json!("hello"));
    }

    #[test]
    fn test_text_that_looks_like_json_stays_text() {
        assert_eq!(
            from_sqlite_value(ValueRef::Text(b"{\"key\": 1}")),
            json!("{\"key\": 1}")
        );
    }

    #[test]
    fn test_binary_blob_is_base64() {
        assert_eq!(
            from_sqlite_value(ValueRef::Blob(&[0xff, 0xfe, 0x00])),
            json!("//4A")
        );
    }
}
