use std::collections::BTreeMap;

use diskdb_core::{ResultSet, Value};

use crate::{peripheral::DatabasePeripheral, Error, Result};

/// Caller-written SQL with positional parameters.
///
/// The SQL text is not inspected. Parameters may be set in any order and
/// with gaps; a placeholder left unbound makes `execute` fail.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
  peripheral: DatabasePeripheral,
  sql:        String,
  parameters: BTreeMap<usize, Value>,
}

fn position(index: i64) -> Result<usize> {
  usize::try_from(index)
    .ok()
    .filter(|i| *i >= 1)
    .ok_or_else(|| Error::BadArgument("Index must be equal or greater than 1.".into()))
}

impl PreparedStatement {
  pub(crate) fn new(peripheral: DatabasePeripheral, sql: String) -> Self {
    Self::with_parameters(peripheral, sql, BTreeMap::new())
  }

  pub(crate) fn with_parameters(
    peripheral: DatabasePeripheral,
    sql:        String,
    parameters: BTreeMap<usize, Value>,
  ) -> Self {
    Self { peripheral, sql, parameters }
  }

  pub fn sql(&self) -> &str { &self.sql }

  pub fn parameters(&self) -> &BTreeMap<usize, Value> { &self.parameters }

  /// Bind `value` at 1-based `index`, replacing any earlier binding.
  pub fn set_parameter(&mut self, index: i64, value: impl Into<Value>) -> Result<&mut Self> {
    self.parameters.insert(position(index)?, value.into());
    Ok(self)
  }

  pub fn remove_parameter(&mut self, index: i64) -> Result<&mut Self> {
    self.parameters.remove(&position(index)?);
    Ok(self)
  }

  pub async fn execute(self) -> Result<ResultSet> {
    self.peripheral.run(&self.sql, &self.parameters).await
  }
}
