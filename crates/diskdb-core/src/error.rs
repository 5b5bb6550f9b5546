//! Error types for `diskdb-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A table or column name failed the identifier pattern.
  #[error(
    "Names may only contain alphanumeric symbols, underscores (_), number signs (#), \
     dollar signs ($), or at signs (@), and may only start with a letter or underscore."
  )]
  InvalidIdentifier(String),

  #[error("Type must be either TEXT, INTEGER, REAL or BLOB.")]
  InvalidColumnType(String),

  #[error("unsupported value: {0}")]
  UnsupportedValue(String),

  #[error("id allocation failed: {0}")]
  Allocation(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
