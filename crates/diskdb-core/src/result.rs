//! Normalised statement results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Value;

/// One result row, keyed by column name in column order.
pub type Row = IndexMap<String, Value>;

/// The fully materialised outcome of one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
  pub columns: Vec<String>,
  pub rows:    Vec<Row>,
  /// Rows inserted, updated or deleted; zero for queries and DDL.
  pub changes: u64,
}

impl ResultSet {
  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn len(&self) -> usize { self.rows.len() }
}
