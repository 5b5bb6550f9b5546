//! The closed scalar type accepted from and returned to scripted callers.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single scalar crossing the scripting boundary.
///
/// Callers hand builders these values; they are always bound as statement
/// parameters and never spliced into SQL text. Result rows are normalised
/// into the same type, except that the engine never yields `Bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self { Self::Integer(i64::from(i)) }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self { Self::Integer(i) }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self { Self::Real(f) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<Vec<u8>> for Value {
  fn from(b: Vec<u8>) -> Self { Self::Blob(b) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

/// Caller input arriving as JSON (e.g. from the command line).
///
/// Numbers become `Integer` when they fit an `i64`, `Real` otherwise. An
/// array of byte-sized integers is a `Blob`; any other array or object is
/// rejected since it has no scalar meaning.
impl TryFrom<serde_json::Value> for Value {
  type Error = Error;

  fn try_from(json: serde_json::Value) -> Result<Self> {
    use serde_json::Value as Json;

    match json {
      Json::Null => Ok(Self::Null),
      Json::Bool(b) => Ok(Self::Bool(b)),
      Json::Number(n) => n
        .as_i64()
        .map(Self::Integer)
        .or_else(|| n.as_f64().map(Self::Real))
        .ok_or_else(|| Error::UnsupportedValue(n.to_string())),
      Json::String(s) => Ok(Self::Text(s)),
      Json::Array(items) => items
        .iter()
        .map(|item| {
          item
            .as_u64()
            .and_then(|b| u8::try_from(b).ok())
            .ok_or_else(|| Error::UnsupportedValue(item.to_string()))
        })
        .collect::<Result<Vec<u8>>>()
        .map(Self::Blob),
      other @ Json::Object(_) => Err(Error::UnsupportedValue(other.to_string())),
    }
  }
}
