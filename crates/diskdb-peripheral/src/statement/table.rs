use diskdb_core::{
  column::{ColumnType, SqlColumn},
  ident::{check_name, fold},
  ResultSet,
};
use indexmap::IndexMap;
use tracing::debug;

use super::Compiled;
use crate::{peripheral::DatabasePeripheral, Error, Result};

const DEFAULT_KEY: &str = "id";

/// `CREATE TABLE <table> (...)`.
///
/// At most one column is the primary key. If none is chosen by the time the
/// statement compiles, an `id INTEGER PRIMARY KEY AUTOINCREMENT` column is
/// added in front, provided no column is already called `id`.
#[derive(Debug, Clone)]
pub struct TableCreator {
  peripheral:     DatabasePeripheral,
  table:          String,
  columns:        IndexMap<String, SqlColumn>,
  /// Case-folded name of the primary-key column.
  primary_key:    Option<String>,
  auto_increment: bool,
}

impl TableCreator {
  pub(crate) fn new(peripheral: DatabasePeripheral, table: String) -> Self {
    Self {
      peripheral,
      table,
      columns: IndexMap::new(),
      primary_key: None,
      auto_increment: false,
    }
  }

  /// A nullable, non-unique column.
  pub fn add_column(&mut self, name: &str, column_type: &str) -> Result<&mut Self> {
    self.add_column_with(name, column_type, false, false)
  }

  /// Declare a column, replacing any column of the same name.
  pub fn add_column_with(
    &mut self,
    name:        &str,
    column_type: &str,
    not_null:    bool,
    unique:      bool,
  ) -> Result<&mut Self> {
    check_name(name)?;
    let column_type: ColumnType = column_type.parse()?;
    let key = fold(name);
    if self.auto_increment
      && self.primary_key.as_deref() == Some(key.as_str())
      && column_type != ColumnType::Integer
    {
      return Err(Error::BadArgument("This column is not INTEGER. Cannot auto increment.".into()));
    }
    self.columns.insert(key, SqlColumn::new(name, column_type, not_null, unique));
    Ok(self)
  }

  /// Drop a column. Dropping the primary-key column also forgets the key.
  pub fn remove_column(&mut self, name: &str) -> &mut Self {
    let key = fold(name);
    if self.primary_key.as_deref() == Some(key.as_str()) {
      self.primary_key = None;
      self.auto_increment = false;
    }
    self.columns.shift_remove(&key);
    self
  }

  pub fn set_primary_key(&mut self, name: &str, auto_increment: bool) -> Result<&mut Self> {
    let key = fold(name);
    let column = self
      .columns
      .get(&key)
      .ok_or_else(|| Error::BadArgument("This column does not exist.".into()))?;

    if auto_increment && column.column_type() != ColumnType::Integer {
      return Err(Error::BadArgument("This column is not INTEGER. Cannot auto increment.".into()));
    }

    self.primary_key = Some(key);
    self.auto_increment = auto_increment;
    Ok(self)
  }

  pub fn compile(&self) -> Result<Compiled> {
    let mut columns = self.columns.clone();
    let (primary_key, auto_increment) = match &self.primary_key {
      Some(key) => (key.clone(), self.auto_increment),
      None => {
        if columns.contains_key(DEFAULT_KEY) {
          return Err(Error::Conflict(
            "Column id already exists, cannot create primary key.".into(),
          ));
        }
        columns.shift_insert(
          0,
          DEFAULT_KEY.to_owned(),
          SqlColumn::new(DEFAULT_KEY, ColumnType::Integer, false, false),
        );
        (DEFAULT_KEY.to_owned(), true)
      }
    };

    let definitions = columns
      .iter()
      .map(|(key, col)| {
        let mut def = format!("{} {}", col.name(), col.column_type());
        if *key == primary_key {
          def.push_str(" PRIMARY KEY");
          if auto_increment {
            def.push_str(" AUTOINCREMENT");
          }
        } else {
          if col.is_unique() {
            def.push_str(" UNIQUE");
          }
          if col.is_not_null() {
            def.push_str(" NOT NULL");
          }
        }
        def
      })
      .collect::<Vec<_>>()
      .join(", ");

    Ok(Compiled::bare(format!("CREATE TABLE {} ({definitions})", self.table)))
  }

  pub async fn execute(self) -> Result<ResultSet> {
    self.peripheral.ready_host()?;
    let Compiled { sql, params } = self.compile()?;
    debug!(%sql, "compiled table creation");
    self.peripheral.run(&sql, &params).await
  }
}
