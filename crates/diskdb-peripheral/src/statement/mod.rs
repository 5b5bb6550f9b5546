//! Statement builders.
//!
//! Each builder accumulates caller input and compiles it into exactly one
//! SQL statement plus positional parameters. Table and column names are
//! checked against the identifier pattern when they are captured, since
//! they end up in the SQL text; values only ever travel as parameters.
//!
//! Builders are single-use: mutators take `&mut self`, `execute` consumes
//! the builder. Column lists keep the order in which columns were added.

mod filter;
mod insert;
mod prepared;
mod table;

use std::collections::BTreeMap;

use diskdb_core::Value;

pub use filter::{Delete, Select};
pub use insert::Insert;
pub use prepared::PreparedStatement;
pub use table::TableCreator;

/// SQL text plus its parameters, keyed by 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
  pub sql:    String,
  pub params: BTreeMap<usize, Value>,
}

impl Compiled {
  /// Statement without parameters.
  pub fn bare(sql: String) -> Self { Self { sql, params: BTreeMap::new() } }

  /// Number the values 1, 2, 3, ... in iteration order.
  fn positional(sql: String, values: impl IntoIterator<Item = Value>) -> Self {
    let params = values.into_iter().enumerate().map(|(i, v)| (i + 1, v)).collect();
    Self { sql, params }
  }
}
