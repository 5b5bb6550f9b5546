//! Errors raised across the scripting boundary.
//!
//! Messages are shown to scripted callers verbatim. Anything that is not the
//! caller's fault collapses into [`Error::Internal`]; the cause is logged
//! here and never returned.

use std::fmt::Display;

use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("There is no disk inserted")]
  NoDiskInserted,

  #[error(
    "Names may only contain alphanumeric symbols, underscores (_), number signs (#), \
     dollar signs ($), or at signs (@), and may only start with a letter or underscore."
  )]
  InvalidIdentifier(String),

  #[error("Type must be either TEXT, INTEGER, REAL or BLOB.")]
  InvalidColumnType(String),

  /// The host behind a handle has left the world.
  #[error("The peripheral does not exist.")]
  PeripheralInvalid,

  #[error("{0}")]
  BadArgument(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Internal Error. Please send an issue if the problem persists.")]
  Internal,
}

impl Error {
  pub(crate) fn internal(cause: impl Display) -> Self {
    error!(%cause, "internal peripheral error");
    Self::Internal
  }
}

impl From<diskdb_core::Error> for Error {
  fn from(e: diskdb_core::Error) -> Self {
    match e {
      diskdb_core::Error::InvalidIdentifier(name) => Self::InvalidIdentifier(name),
      diskdb_core::Error::InvalidColumnType(ty) => Self::InvalidColumnType(ty),
      diskdb_core::Error::UnsupportedValue(v) => Self::BadArgument(format!("Unsupported value: {v}")),
      other => Self::internal(other),
    }
  }
}

impl From<diskdb_store_sqlite::Error> for Error {
  fn from(e: diskdb_store_sqlite::Error) -> Self { Self::internal(e) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
