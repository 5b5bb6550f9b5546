//! `SELECT` and `DELETE`, both restricted by a conjunction of equalities.

use diskdb_core::{
  ident::{check_name, fold},
  ResultSet, Value,
};
use indexmap::IndexMap;
use tracing::debug;

use super::{Compiled, PreparedStatement};
use crate::{peripheral::DatabasePeripheral, Result};

/// `column = value` conditions joined with `AND`.
#[derive(Debug, Clone, Default)]
struct Conditions(IndexMap<String, Value>);

impl Conditions {
  fn add(&mut self, column: &str, value: Value) -> Result<()> {
    check_name(column)?;
    self.0.insert(fold(column), value);
    Ok(())
  }

  fn remove(&mut self, column: &str) { self.0.shift_remove(&fold(column)); }

  /// `head` followed by a WHERE clause; no conditions means no WHERE.
  fn compile(&self, head: String) -> Compiled {
    if self.0.is_empty() {
      return Compiled::bare(head);
    }

    let clause = self
      .0
      .keys()
      .map(|column| format!("{column} = ?"))
      .collect::<Vec<_>>()
      .join(" AND ");
    Compiled::positional(format!("{head} WHERE {clause}"), self.0.values().cloned())
  }
}

async fn run(peripheral: DatabasePeripheral, compiled: Compiled) -> Result<ResultSet> {
  peripheral.ready_host()?;
  let Compiled { sql, params } = compiled;
  debug!(%sql, "compiled filtered statement");
  PreparedStatement::with_parameters(peripheral, sql, params).execute().await
}

// ─── Select ──────────────────────────────────────────────────────────────────

/// `SELECT * FROM <table> [WHERE ...]`.
#[derive(Debug, Clone)]
pub struct Select {
  peripheral: DatabasePeripheral,
  table:      String,
  conditions: Conditions,
}

impl Select {
  pub(crate) fn new(peripheral: DatabasePeripheral, table: String) -> Self {
    Self { peripheral, table, conditions: Conditions::default() }
  }

  pub fn add_condition(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
    self.conditions.add(column, value.into())?;
    Ok(self)
  }

  pub fn remove_condition(&mut self, column: &str) -> &mut Self {
    self.conditions.remove(column);
    self
  }

  pub fn compile(&self) -> Compiled {
    self.conditions.compile(format!("SELECT * FROM {}", self.table))
  }

  pub async fn execute(self) -> Result<ResultSet> {
    let compiled = self.compile();
    run(self.peripheral, compiled).await
  }
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE FROM <table> [WHERE ...]`.
///
/// With no conditions this deletes every row of the table.
#[derive(Debug, Clone)]
pub struct Delete {
  peripheral: DatabasePeripheral,
  table:      String,
  conditions: Conditions,
}

impl Delete {
  pub(crate) fn new(peripheral: DatabasePeripheral, table: String) -> Self {
    Self { peripheral, table, conditions: Conditions::default() }
  }

  pub fn add_condition(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
    self.conditions.add(column, value.into())?;
    Ok(self)
  }

  pub fn remove_condition(&mut self, column: &str) -> &mut Self {
    self.conditions.remove(column);
    self
  }

  pub fn compile(&self) -> Compiled {
    self.conditions.compile(format!("DELETE FROM {}", self.table))
  }

  pub async fn execute(self) -> Result<ResultSet> {
    let compiled = self.compile();
    run(self.peripheral, compiled).await
  }
}
