//! Conversions between caller [`Value`]s and SQLite storage classes.
//!
//! SQLite has no boolean type, so `Bool` is bound as integer 0/1 and reads
//! back as `Integer`.

use diskdb_core::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Blob(b) => SqlValue::Blob(b.clone()),
  }
}

pub fn decode_value(raw: ValueRef<'_>) -> Value {
  match raw {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(f) => Value::Real(f),
    ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
  }
}
