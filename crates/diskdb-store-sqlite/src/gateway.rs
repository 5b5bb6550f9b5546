//! [`ExecutionGateway`]: runs one statement against one disk's database file.

use std::{
  collections::{BTreeMap, HashMap},
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use diskdb_core::{ResultSet, Row, Value};
use rusqlite::types::Value as SqlValue;
use tracing::{debug, warn};

use crate::{
  encode::{decode_value, encode_value},
  Result,
};

/// Executes statements against database files, one at a time per file.
///
/// A connection is opened for every call and closed before returning, so a
/// file that disappears between calls makes the next call fail instead of
/// writing to a stale handle.
#[derive(Debug, Default)]
pub struct ExecutionGateway {
  locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl ExecutionGateway {
  pub fn new() -> Self { Self::default() }

  /// The lock for `path`. Locks nobody holds or waits on are dropped here,
  /// so the map only tracks files with calls in flight.
  fn file_lock(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks.entry(path.to_path_buf()).or_default().clone()
  }

  #[cfg(test)]
  pub(crate) fn tracked_files(&self) -> usize {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks.len()
  }

  /// Run ad hoc SQL with no parameters.
  pub async fn execute_sql(&self, path: &Path, sql: &str) -> Result<ResultSet> {
    self.execute(path, sql, &BTreeMap::new()).await
  }

  /// Run `sql` with `params` bound by 1-based position.
  ///
  /// Every placeholder in the statement must be bound; a gap in `params` is
  /// an error rather than an implicit NULL.
  pub async fn execute(
    &self,
    path:   &Path,
    sql:    &str,
    params: &BTreeMap<usize, Value>,
  ) -> Result<ResultSet> {
    let lock = self.file_lock(path);
    let _guard = lock.lock().await;

    debug!(path = %path.display(), sql, params = params.len(), "executing statement");

    let sql = sql.to_owned();
    let params: BTreeMap<usize, SqlValue> =
      params.iter().map(|(i, v)| (*i, encode_value(v))).collect();

    let conn = tokio_rusqlite::Connection::open(path).await?;
    let result = conn.call(move |conn| run(conn, &sql, &params)).await;
    if let Err(e) = conn.close().await {
      warn!(path = %path.display(), error = %e, "failed to close database");
    }

    Ok(result?)
  }
}

fn run(
  conn:   &mut rusqlite::Connection,
  sql:    &str,
  params: &BTreeMap<usize, SqlValue>,
) -> tokio_rusqlite::Result<ResultSet> {
  let (columns, rows) = {
    let mut stmt = conn.prepare(sql)?;

    for index in 1..=stmt.parameter_count() {
      if !params.contains_key(&index) {
        return Err(rusqlite::Error::InvalidParameterName(format!("?{index} is not bound")).into());
      }
    }
    for (index, value) in params {
      stmt.raw_bind_parameter(*index, value)?;
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();

    let mut rows = Vec::new();
    let mut raw = stmt.raw_query();
    while let Some(row) = raw.next()? {
      let mut out = Row::with_capacity(columns.len());
      for (i, name) in columns.iter().enumerate() {
        out.insert(name.clone(), decode_value(row.get_ref(i)?));
      }
      rows.push(out);
    }
    (columns, rows)
  };

  // Fresh connection: this only reflects the statement above.
  let changes = conn.changes() as u64;

  Ok(ResultSet { columns, rows, changes })
}
