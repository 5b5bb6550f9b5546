//! Tests for the peripheral, its builders and host lifecycle against a
//! temporary world.

use std::sync::Arc;

use diskdb_core::{disk::ItemStack, Error as CoreError, IdAllocator, Value};
use diskdb_store_sqlite::{ExecutionGateway, SaveDir};
use tempfile::TempDir;

use crate::{DatabaseHost, DatabasePeripheral, Error, HostRegistry};

struct World {
  _dir:     TempDir,
  save:     Arc<SaveDir>,
  registry: Arc<HostRegistry>,
  gateway:  Arc<ExecutionGateway>,
}

impl World {
  fn new() -> Self {
    let dir = tempfile::tempdir().expect("temp dir");
    let save = Arc::new(SaveDir::new(dir.path().join("save")));
    Self {
      _dir: dir,
      save,
      registry: Arc::new(HostRegistry::new()),
      gateway: Arc::new(ExecutionGateway::new()),
    }
  }

  fn place(&self, host: DatabaseHost) -> (Arc<DatabaseHost>, DatabasePeripheral) {
    let host = Arc::new(host);
    let handle = self.registry.insert(Arc::clone(&host));
    let peripheral =
      DatabasePeripheral::new(Arc::clone(&self.registry), Arc::clone(&self.gateway), handle);
    (host, peripheral)
  }

  /// A host with a blank disk inserted.
  fn host(&self) -> (Arc<DatabaseHost>, DatabasePeripheral) {
    let (host, peripheral) = self.place(DatabaseHost::new(Arc::clone(&self.save)));
    assert!(host.insert_disk(ItemStack::disk()).is_none());
    (host, peripheral)
  }
}

struct Broken;

impl IdAllocator for Broken {
  fn allocate(&self, _kind: &str) -> diskdb_core::Result<i32> {
    Err(CoreError::Allocation("disk full".into()))
  }
}

// ─── Compilation ─────────────────────────────────────────────────────────────

#[test]
fn insert_compiles_in_insertion_order() {
  let w = World::new();
  let (_, p) = w.host();

  let mut insert = p.prepare_insert("t").unwrap();
  insert.add_value("A", 1).unwrap().add_value("b", 2).unwrap();
  let compiled = insert.compile();

  assert_eq!(compiled.sql, "INSERT INTO t (a, b) VALUES (?, ?)");
  assert_eq!(compiled.params.len(), 2);
  assert_eq!(compiled.params[&1], Value::Integer(1));
  assert_eq!(compiled.params[&2], Value::Integer(2));
}

#[test]
fn insert_overwrite_and_remove_are_case_insensitive() {
  let w = World::new();
  let (_, p) = w.host();

  let mut insert = p.prepare_insert("t").unwrap();
  insert.add_value("name", "a").unwrap();
  insert.add_value("age", 3).unwrap();
  insert.add_value("NAME", "b").unwrap();
  insert.remove_value("AGE");

  let compiled = insert.compile();
  assert_eq!(compiled.sql, "INSERT INTO t (name) VALUES (?)");
  assert_eq!(compiled.params[&1], Value::Text("b".into()));

  insert.remove_value("name");
  assert_eq!(insert.compile().sql, "INSERT INTO t DEFAULT VALUES");
}

#[test]
fn filters_without_conditions_have_no_where() {
  let w = World::new();
  let (_, p) = w.host();

  let select = p.prepare_select("users").unwrap();
  assert_eq!(select.compile().sql, "SELECT * FROM users");
  assert!(select.compile().params.is_empty());

  let delete = p.prepare_delete("users").unwrap();
  assert_eq!(delete.compile().sql, "DELETE FROM users");
}

#[test]
fn filters_join_conditions_with_and() {
  let w = World::new();
  let (_, p) = w.host();

  let mut select = p.prepare_select("users").unwrap();
  select.add_condition("Name", "a").unwrap();
  select.add_condition("age", 30).unwrap();
  select.add_condition("city", Value::Null).unwrap();
  select.remove_condition("CITY");
  let compiled = select.compile();
  assert_eq!(compiled.sql, "SELECT * FROM users WHERE name = ? AND age = ?");
  assert_eq!(compiled.params[&1], Value::Text("a".into()));
  assert_eq!(compiled.params[&2], Value::Integer(30));

  let mut delete = p.prepare_delete("users").unwrap();
  delete.add_condition("id", 4).unwrap();
  assert_eq!(delete.compile().sql, "DELETE FROM users WHERE id = ?");
}

#[test]
fn table_without_key_gets_synthetic_id() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("notes").unwrap();
  create.add_column_with("body", "text", true, false).unwrap();
  create.add_column_with("slug", "TEXT", false, true).unwrap();

  assert_eq!(
    create.compile().unwrap().sql,
    "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL, slug TEXT UNIQUE)"
  );
}

#[test]
fn synthetic_id_refuses_existing_id_column() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("notes").unwrap();
  create.add_column("ID", "text").unwrap();
  assert!(matches!(create.compile(), Err(Error::Conflict(_))));
}

#[test]
fn explicit_primary_key() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("users").unwrap();
  create.add_column_with("name", "TEXT", true, false).unwrap();
  create.add_column("uid", "integer").unwrap();
  create.set_primary_key("UID", false).unwrap();

  assert_eq!(
    create.compile().unwrap().sql,
    "CREATE TABLE users (name TEXT NOT NULL, uid INTEGER PRIMARY KEY)"
  );
}

#[test]
fn primary_key_argument_checks() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("t").unwrap();
  create.add_column("label", "TEXT").unwrap();

  let err = create.set_primary_key("missing", false).unwrap_err();
  assert_eq!(err.to_string(), "This column does not exist.");

  let err = create.set_primary_key("label", true).unwrap_err();
  assert_eq!(err.to_string(), "This column is not INTEGER. Cannot auto increment.");

  // A text key without auto increment is fine.
  create.set_primary_key("label", false).unwrap();
}

#[test]
fn auto_increment_key_cannot_be_retyped() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("t").unwrap();
  create.add_column("k", "INTEGER").unwrap();
  create.set_primary_key("k", true).unwrap();

  let err = create.add_column("K", "TEXT").unwrap_err();
  assert_eq!(err.to_string(), "This column is not INTEGER. Cannot auto increment.");
  assert_eq!(
    create.compile().unwrap().sql,
    "CREATE TABLE t (k INTEGER PRIMARY KEY AUTOINCREMENT)"
  );

  // Redeclaring it as INTEGER is still allowed.
  create.add_column_with("k", "integer", true, false).unwrap();

  // Without auto increment the key may take any type.
  create.set_primary_key("k", false).unwrap();
  create.add_column("k", "TEXT").unwrap();
  assert_eq!(create.compile().unwrap().sql, "CREATE TABLE t (k TEXT PRIMARY KEY)");
}

#[test]
fn removing_key_column_forgets_key() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("t").unwrap();
  // No key yet: removal must not trip over the absent key.
  create.remove_column("nothing");

  create.add_column("n", "INTEGER").unwrap();
  create.add_column("v", "REAL").unwrap();
  create.set_primary_key("n", true).unwrap();
  create.remove_column("N");

  assert_eq!(
    create.compile().unwrap().sql,
    "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, v REAL)"
  );
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[test]
fn identifiers_are_validated_everywhere() {
  let w = World::new();
  let (_, p) = w.host();
  let bad = "users; DROP TABLE users";

  assert!(matches!(p.prepare_insert(bad), Err(Error::InvalidIdentifier(_))));
  assert!(matches!(p.prepare_select(bad), Err(Error::InvalidIdentifier(_))));
  assert!(matches!(p.prepare_delete(bad), Err(Error::InvalidIdentifier(_))));
  assert!(matches!(p.prepare_table_creation(bad), Err(Error::InvalidIdentifier(_))));

  let mut insert = p.prepare_insert("t").unwrap();
  assert!(matches!(insert.add_value("a) VALUES (1); --", 1), Err(Error::InvalidIdentifier(_))));
  let mut select = p.prepare_select("t").unwrap();
  assert!(matches!(select.add_condition("1=1 OR a", 1), Err(Error::InvalidIdentifier(_))));
  let mut delete = p.prepare_delete("t").unwrap();
  assert!(matches!(delete.add_condition("", 1), Err(Error::InvalidIdentifier(_))));
  let mut create = p.prepare_table_creation("t").unwrap();
  assert!(matches!(create.add_column("9lives", "TEXT"), Err(Error::InvalidIdentifier(_))));
}

#[test]
fn column_type_is_validated() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("t").unwrap();
  let err = create.add_column("a", "VARCHAR").unwrap_err();
  assert!(matches!(err, Error::InvalidColumnType(_)));
  assert_eq!(err.to_string(), "Type must be either TEXT, INTEGER, REAL or BLOB.");
}

#[test]
fn parameter_index_must_be_positive() {
  let w = World::new();
  let (_, p) = w.host();

  let mut stmt = p.prepare_statement("SELECT ?");
  assert!(matches!(stmt.set_parameter(0, 1), Err(Error::BadArgument(_))));
  assert!(matches!(stmt.set_parameter(-4, 1), Err(Error::BadArgument(_))));
  assert!(matches!(stmt.remove_parameter(0), Err(Error::BadArgument(_))));

  stmt.set_parameter(3, "x").unwrap().set_parameter(1, 2).unwrap();
  stmt.remove_parameter(3).unwrap().remove_parameter(9).unwrap();
  assert_eq!(stmt.parameters().keys().copied().collect::<Vec<_>>(), [1]);
}

// ─── Execution ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_scenario() {
  let w = World::new();
  let (host, p) = w.host();
  assert!(host.assign_database_id(true).unwrap().is_some());

  let mut create = p.prepare_table_creation("users").unwrap();
  create.add_column_with("name", "TEXT", true, false).unwrap();
  create.add_column("id", "INTEGER").unwrap();
  create.set_primary_key("id", true).unwrap();
  create.execute().await.unwrap();

  let mut insert = p.prepare_insert("users").unwrap();
  insert.add_value("name", "a").unwrap();
  let inserted = insert.execute().await.unwrap();
  assert_eq!(inserted.changes, 1);

  let rows = p.prepare_select("users").unwrap().execute().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows.rows[0]["name"], Value::Text("a".into()));
  assert_eq!(rows.rows[0]["id"], Value::Integer(1));
}

#[tokio::test]
async fn select_and_delete_by_condition() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("pets").unwrap();
  create.add_column("kind", "TEXT").unwrap();
  create.add_column("legs", "INTEGER").unwrap();
  create.execute().await.unwrap();

  for (kind, legs) in [("cat", 4), ("dog", 4), ("bird", 2)] {
    let mut insert = p.prepare_insert("pets").unwrap();
    insert.add_value("kind", kind).unwrap().add_value("legs", legs).unwrap();
    insert.execute().await.unwrap();
  }

  let mut four = p.prepare_select("pets").unwrap();
  four.add_condition("legs", 4).unwrap();
  assert_eq!(four.execute().await.unwrap().len(), 2);

  let mut cat = p.prepare_select("pets").unwrap();
  cat.add_condition("legs", 4).unwrap().add_condition("kind", "cat").unwrap();
  let rows = cat.execute().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows.rows[0]["kind"], Value::Text("cat".into()));

  let mut delete = p.prepare_delete("pets").unwrap();
  delete.add_condition("kind", "dog").unwrap();
  assert_eq!(delete.execute().await.unwrap().changes, 1);

  let everything = p.prepare_delete("pets").unwrap();
  assert_eq!(everything.execute().await.unwrap().changes, 2);
  assert!(p.prepare_select("pets").unwrap().execute().await.unwrap().is_empty());
}

#[tokio::test]
async fn prepared_statement_and_raw_sql() {
  let w = World::new();
  let (_, p) = w.host();

  p.execute_sql("CREATE TABLE kv (k TEXT PRIMARY KEY, v BLOB)").await.unwrap();

  let mut stmt = p.prepare_statement("INSERT INTO kv VALUES (?, ?)");
  stmt.set_parameter(2, vec![1_u8, 2, 3]).unwrap().set_parameter(1, "key").unwrap();
  stmt.execute().await.unwrap();

  let mut read = p.prepare_statement("SELECT v FROM kv WHERE k = ?1");
  read.set_parameter(1, "key").unwrap();
  let rows = read.execute().await.unwrap();
  assert_eq!(rows.rows[0]["v"], Value::Blob(vec![1, 2, 3]));
}

#[tokio::test]
async fn engine_failures_are_internal() {
  let w = World::new();
  let (_, p) = w.host();

  let err = p.execute_sql("SELEKT nonsense").await.unwrap_err();
  assert!(matches!(err, Error::Internal));
  assert_eq!(err.to_string(), "Internal Error. Please send an issue if the problem persists.");

  // Unbound placeholder.
  p.execute_sql("CREATE TABLE t (a, b)").await.unwrap();
  let mut gap = p.prepare_statement("INSERT INTO t VALUES (?, ?)");
  gap.set_parameter(2, 1).unwrap();
  assert!(matches!(gap.execute().await, Err(Error::Internal)));

  // Table exists already.
  let mut again = p.prepare_table_creation("t").unwrap();
  again.add_column("x", "TEXT").unwrap();
  assert!(matches!(again.execute().await, Err(Error::Internal)));
}

#[tokio::test]
async fn synthetic_id_conflict_fails_execute() {
  let w = World::new();
  let (_, p) = w.host();

  let mut create = p.prepare_table_creation("t").unwrap();
  create.add_column("id", "TEXT").unwrap();
  assert!(matches!(create.execute().await, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn missing_disk() {
  let w = World::new();
  let (host, p) = w.place(DatabaseHost::new(Arc::clone(&w.save)));

  assert!(!p.is_disk_inserted().unwrap());
  assert!(matches!(p.database_id(), Err(Error::NoDiskInserted)));
  assert!(matches!(p.database_name(), Err(Error::NoDiskInserted)));
  assert!(matches!(p.set_database_name("x"), Err(Error::NoDiskInserted)));
  assert!(matches!(p.execute_sql("SELECT 1").await, Err(Error::NoDiskInserted)));
  assert!(matches!(
    p.prepare_select("t").unwrap().execute().await,
    Err(Error::NoDiskInserted)
  ));

  // Non-disk items never make it in.
  assert!(host.insert_disk(ItemStack::other("dirt", 1)).is_some());
  assert!(!p.is_disk_inserted().unwrap());
}

#[tokio::test]
async fn data_follows_the_disk() {
  let w = World::new();
  let (first, p1) = w.host();
  let id = p1.database_id().unwrap();
  p1.set_database_name("ledger").unwrap();
  p1.execute_sql("CREATE TABLE entries (amount INTEGER)").await.unwrap();
  p1.execute_sql("INSERT INTO entries VALUES (12)").await.unwrap();

  // Move the disk to another host.
  let disk = first.eject_disk().unwrap();
  let (second, p2) = w.place(DatabaseHost::new(Arc::clone(&w.save)));
  assert!(second.insert_disk(disk).is_none());

  assert_eq!(p2.database_id().unwrap(), id);
  assert_eq!(p2.database_name().unwrap().as_deref(), Some("ledger"));
  let rows = p2.execute_sql("SELECT amount FROM entries").await.unwrap();
  assert_eq!(rows.rows[0]["amount"], Value::Integer(12));
}

#[tokio::test]
async fn id_allocation_is_lazy_and_stable() {
  let w = World::new();
  let (host, p) = w.host();
  assert_eq!(host.snapshot().stack().unwrap().data.database_id, None);

  let id = p.database_id().unwrap();
  assert_eq!(p.database_id().unwrap(), id);
  assert_eq!(host.assign_database_id(false).unwrap(), None);

  // Reload the slot into a fresh host: same id, same file.
  let saved = host.snapshot();
  let (reloaded, p2) = w.place(DatabaseHost::new(Arc::clone(&w.save)));
  reloaded.restore(saved);
  assert_eq!(p2.database_id().unwrap(), id);
  assert_eq!(reloaded.database_file().unwrap(), host.database_file().unwrap());
}

#[tokio::test]
async fn allocator_failure_is_internal() {
  let w = World::new();
  let (host, p) =
    w.place(DatabaseHost::with_allocator(Arc::clone(&w.save), Arc::new(Broken)));
  host.insert_disk(ItemStack::disk());

  assert!(matches!(p.database_id(), Err(Error::Internal)));
  assert!(matches!(p.execute_sql("SELECT 1").await, Err(Error::Internal)));
}

// ─── Host lifecycle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn every_builder_fails_after_removal() {
  let w = World::new();
  let (_, p) = w.host();
  p.execute_sql("CREATE TABLE t (a INTEGER)").await.unwrap();

  let stmt = p.prepare_statement("SELECT 1");
  let mut insert = p.prepare_insert("t").unwrap();
  insert.add_value("a", 1).unwrap();
  let select = p.prepare_select("t").unwrap();
  let delete = p.prepare_delete("t").unwrap();
  let mut create = p.prepare_table_creation("u").unwrap();
  create.add_column("b", "TEXT").unwrap();

  assert!(w.registry.remove(p.handle()).is_some());

  assert!(matches!(stmt.execute().await, Err(Error::PeripheralInvalid)));
  assert!(matches!(insert.execute().await, Err(Error::PeripheralInvalid)));
  assert!(matches!(select.execute().await, Err(Error::PeripheralInvalid)));
  assert!(matches!(delete.execute().await, Err(Error::PeripheralInvalid)));
  assert!(matches!(create.execute().await, Err(Error::PeripheralInvalid)));
  assert!(matches!(p.execute_sql("SELECT 1").await, Err(Error::PeripheralInvalid)));
  assert!(matches!(p.is_disk_inserted(), Err(Error::PeripheralInvalid)));
  assert_eq!(
    Error::PeripheralInvalid.to_string(),
    "The peripheral does not exist."
  );
}

#[tokio::test]
async fn marked_removed_host_is_invalid() {
  let w = World::new();
  let (host, p) = w.host();
  let select = p.prepare_select("t").unwrap();

  host.mark_removed();
  assert!(matches!(select.execute().await, Err(Error::PeripheralInvalid)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn removal_during_execution_is_invalid() {
  let w = World::new();
  let (_, p) = w.host();
  p.execute_sql("CREATE TABLE t (a INTEGER)").await.unwrap();

  let running = p.clone();
  let task = tokio::spawn(async move {
    running
      .execute_sql(
        "WITH RECURSIVE c(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM c WHERE n < 20000000) \
         SELECT count(*) FROM c",
      )
      .await
  });

  tokio::time::sleep(std::time::Duration::from_millis(100)).await;
  assert!(!task.is_finished());
  assert!(w.registry.remove(p.handle()).is_some());

  assert!(matches!(task.await.unwrap(), Err(Error::PeripheralInvalid)));
}

#[test]
fn stale_handle_never_reaches_new_host() {
  let w = World::new();
  let (_, old) = w.host();
  w.registry.remove(old.handle());

  let (_, new) = w.host();
  assert_ne!(old, new);
  assert!(new.is_disk_inserted().unwrap());
  assert!(matches!(old.is_disk_inserted(), Err(Error::PeripheralInvalid)));
  assert_eq!(w.registry.len(), 1);
}

#[test]
fn switched_on_tracks_attached_callers() {
  let w = World::new();
  let (host, p) = w.host();
  assert!(!host.is_switched_on());

  p.attach(1).unwrap();
  p.attach(2).unwrap();
  p.attach(2).unwrap();
  assert!(host.is_switched_on());
  assert_eq!(host.attached_count(), 2);

  p.detach(1).unwrap();
  assert!(host.is_switched_on());
  p.detach(2).unwrap();
  assert!(!host.is_switched_on());
}

#[test]
fn peripherals_compare_by_host() {
  let w = World::new();
  let (_, a) = w.host();
  let (_, b) = w.host();

  assert_eq!(a, a.clone());
  assert_ne!(a, b);
  assert_eq!(a.peripheral_type(), "database");
}
