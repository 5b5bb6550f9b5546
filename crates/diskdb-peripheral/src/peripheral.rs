//! [`DatabasePeripheral`] — the functions a scripted caller can invoke.

use std::{collections::BTreeMap, sync::Arc};

use diskdb_core::{ident::check_name, ResultSet, Value};
use diskdb_store_sqlite::ExecutionGateway;
use tracing::warn;

use crate::{
  host::{CallerId, DatabaseHost},
  registry::{HostHandle, HostRegistry},
  statement::{Delete, Insert, PreparedStatement, Select, TableCreator},
  Error, Result,
};

/// A caller's view of one database host.
///
/// Cheap to clone; every builder keeps its own copy. Nothing here keeps the
/// host alive: each call resolves the handle again and fails with
/// [`Error::PeripheralInvalid`] once the host has left the world.
#[derive(Clone)]
pub struct DatabasePeripheral {
  registry: Arc<HostRegistry>,
  gateway:  Arc<ExecutionGateway>,
  handle:   HostHandle,
}

impl PartialEq for DatabasePeripheral {
  fn eq(&self, other: &Self) -> bool {
    self.handle == other.handle && Arc::ptr_eq(&self.registry, &other.registry)
  }
}

impl Eq for DatabasePeripheral {}

impl std::fmt::Debug for DatabasePeripheral {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DatabasePeripheral").field("handle", &self.handle).finish_non_exhaustive()
  }
}

impl DatabasePeripheral {
  pub const TYPE: &'static str = "database";

  pub fn new(registry: Arc<HostRegistry>, gateway: Arc<ExecutionGateway>, handle: HostHandle) -> Self {
    Self { registry, gateway, handle }
  }

  pub fn handle(&self) -> HostHandle { self.handle }

  pub fn peripheral_type(&self) -> &'static str { Self::TYPE }

  /// The host behind the handle, provided it is still part of the world.
  pub(crate) fn live_host(&self) -> Result<Arc<DatabaseHost>> {
    match self.registry.get(self.handle) {
      Some(host) if !host.is_removed() => Ok(host),
      _ => {
        warn!(handle = ?self.handle, "call on a peripheral that no longer exists");
        Err(Error::PeripheralInvalid)
      }
    }
  }

  /// A live host with a disk in it.
  pub(crate) fn ready_host(&self) -> Result<Arc<DatabaseHost>> {
    let host = self.live_host()?;
    if !host.is_disk_inserted() {
      return Err(Error::NoDiskInserted);
    }
    Ok(host)
  }

  /// Shared tail of every statement: resolve the file, run, and make sure
  /// the host did not disappear while the engine was busy.
  pub(crate) async fn run(&self, sql: &str, params: &BTreeMap<usize, Value>) -> Result<ResultSet> {
    let file = self.ready_host()?.database_file()?;
    let result = self.gateway.execute(&file, sql, params).await;
    self.live_host()?;
    Ok(result?)
  }

  // ── Attachment ────────────────────────────────────────────────────────────

  pub fn attach(&self, caller: CallerId) -> Result<()> {
    self.live_host()?.attach(caller);
    Ok(())
  }

  pub fn detach(&self, caller: CallerId) -> Result<()> {
    self.live_host()?.detach(caller);
    Ok(())
  }

  // ── Disk ──────────────────────────────────────────────────────────────────

  pub fn is_disk_inserted(&self) -> Result<bool> { Ok(self.live_host()?.is_disk_inserted()) }

  /// The inserted disk's id, allocated on first use.
  pub fn database_id(&self) -> Result<i32> {
    self.ready_host()?.database_id()?.ok_or(Error::NoDiskInserted)
  }

  pub fn database_name(&self) -> Result<Option<String>> {
    Ok(self.ready_host()?.database_name())
  }

  pub fn set_database_name(&self, name: &str) -> Result<()> {
    self.ready_host()?.set_database_name(name);
    Ok(())
  }

  // ── Statements ────────────────────────────────────────────────────────────

  /// Run caller-written SQL as is. No parameters, no validation.
  pub async fn execute_sql(&self, sql: &str) -> Result<ResultSet> {
    self.run(sql, &BTreeMap::new()).await
  }

  pub fn prepare_statement(&self, sql: impl Into<String>) -> PreparedStatement {
    PreparedStatement::new(self.clone(), sql.into())
  }

  pub fn prepare_insert(&self, table: &str) -> Result<Insert> {
    check_name(table)?;
    Ok(Insert::new(self.clone(), table.to_owned()))
  }

  pub fn prepare_table_creation(&self, table: &str) -> Result<TableCreator> {
    check_name(table)?;
    Ok(TableCreator::new(self.clone(), table.to_owned()))
  }

  pub fn prepare_select(&self, table: &str) -> Result<Select> {
    check_name(table)?;
    Ok(Select::new(self.clone(), table.to_owned()))
  }

  pub fn prepare_delete(&self, table: &str) -> Result<Delete> {
    check_name(table)?;
    Ok(Delete::new(self.clone(), table.to_owned()))
  }
}
