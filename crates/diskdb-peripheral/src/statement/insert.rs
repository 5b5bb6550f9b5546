use diskdb_core::{
  ident::{check_name, fold},
  ResultSet, Value,
};
use indexmap::IndexMap;
use tracing::debug;

use super::{Compiled, PreparedStatement};
use crate::{peripheral::DatabasePeripheral, Result};

/// `INSERT INTO <table> (...) VALUES (...)`, one row.
#[derive(Debug, Clone)]
pub struct Insert {
  peripheral: DatabasePeripheral,
  table:      String,
  values:     IndexMap<String, Value>,
}

impl Insert {
  pub(crate) fn new(peripheral: DatabasePeripheral, table: String) -> Self {
    Self { peripheral, table, values: IndexMap::new() }
  }

  /// Set the value for `column`. Setting a column twice keeps its position
  /// and replaces the value.
  pub fn add_value(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
    check_name(column)?;
    self.values.insert(fold(column), value.into());
    Ok(self)
  }

  pub fn remove_value(&mut self, column: &str) -> &mut Self {
    self.values.shift_remove(&fold(column));
    self
  }

  pub fn compile(&self) -> Compiled {
    if self.values.is_empty() {
      return Compiled::bare(format!("INSERT INTO {} DEFAULT VALUES", self.table));
    }

    let columns = self.values.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; self.values.len()].join(", ");
    Compiled::positional(
      format!("INSERT INTO {} ({columns}) VALUES ({placeholders})", self.table),
      self.values.values().cloned(),
    )
  }

  pub async fn execute(self) -> Result<ResultSet> {
    self.peripheral.ready_host()?;
    let Compiled { sql, params } = self.compile();
    debug!(%sql, "compiled insert");
    PreparedStatement::with_parameters(self.peripheral, sql, params).execute().await
  }
}
