//! Column definitions used by table creation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The logical storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
  Text,
  Integer,
  Real,
  Blob,
}

impl ColumnType {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Text => "TEXT",
      Self::Integer => "INTEGER",
      Self::Real => "REAL",
      Self::Blob => "BLOB",
    }
  }
}

impl fmt::Display for ColumnType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_sql()) }
}

/// Case-insensitive: `"text"`, `"Text"` and `"TEXT"` are all accepted.
impl FromStr for ColumnType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_uppercase().as_str() {
      "TEXT" => Ok(Self::Text),
      "INTEGER" => Ok(Self::Integer),
      "REAL" => Ok(Self::Real),
      "BLOB" => Ok(Self::Blob),
      _ => Err(Error::InvalidColumnType(s.to_owned())),
    }
  }
}

/// A column as declared by a caller building a table.
///
/// `name` keeps the caller's spelling; lookups elsewhere go through the
/// case-folded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlColumn {
  name:        String,
  column_type: ColumnType,
  not_null:    bool,
  unique:      bool,
}

impl SqlColumn {
  pub fn new(name: impl Into<String>, column_type: ColumnType, not_null: bool, unique: bool) -> Self {
    Self { name: name.into(), column_type, not_null, unique }
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn column_type(&self) -> ColumnType { self.column_type }

  pub fn is_not_null(&self) -> bool { self.not_null }

  pub fn is_unique(&self) -> bool { self.unique }
}
