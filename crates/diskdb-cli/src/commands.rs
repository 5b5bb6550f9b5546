//! Subcommands, each run against one peripheral.

use anyhow::{bail, Context as _};
use clap::Subcommand;
use diskdb_core::{disk::ItemStack, Value, DATABASE_KIND};
use diskdb_peripheral::{DatabaseHost, DatabasePeripheral};
use diskdb_store_sqlite::SaveDir;
use serde_json::json;

#[derive(Subcommand)]
pub enum Command {
  /// Show whether a disk is inserted, and its id and name.
  Info,
  /// Insert a new disk into the slot.
  Insert {
    /// Reuse an existing database id instead of allocating one lazily.
    #[arg(long)]
    id:   Option<i32>,
    #[arg(long)]
    name: Option<String>,
  },
  /// Take the disk out of the slot.
  Eject,
  /// Rename the inserted disk.
  Rename { name: String },
  /// Run SQL as is.
  Sql { sql: String },
  /// Run SQL with positional parameters (JSON, or bare text).
  Statement {
    sql:    String,
    #[arg(short, long = "param")]
    params: Vec<String>,
  },
  /// Insert one row of `COLUMN=VALUE` pairs.
  InsertRow {
    table:  String,
    #[arg(short, long = "value")]
    values: Vec<String>,
  },
  /// Create a table from `NAME:TYPE[:not_null][:unique]` columns.
  CreateTable {
    table:          String,
    #[arg(short, long = "column")]
    columns:        Vec<String>,
    /// Make this column the primary key instead of a synthetic `id`.
    #[arg(long)]
    primary_key:    Option<String>,
    #[arg(long, requires = "primary_key")]
    auto_increment: bool,
  },
  /// Select rows matching every `COLUMN=VALUE` condition.
  Select {
    table:      String,
    #[arg(short, long = "where")]
    conditions: Vec<String>,
  },
  /// Delete rows matching every `COLUMN=VALUE` condition (all rows if none).
  Delete {
    table:      String,
    #[arg(short, long = "where")]
    conditions: Vec<String>,
  },
}

/// Parse a value given on the command line: JSON if it parses, text
/// otherwise, so `--param alice` and `--param '"alice"'` are the same.
pub fn parse_value(raw: &str) -> anyhow::Result<Value> {
  match serde_json::from_str::<serde_json::Value>(raw) {
    Ok(json) => Value::try_from(json).with_context(|| format!("unsupported value {raw:?}")),
    Err(_) => Ok(Value::Text(raw.to_owned())),
  }
}

pub fn parse_condition(raw: &str) -> anyhow::Result<(String, Value)> {
  let Some((column, value)) = raw.split_once('=') else {
    bail!("condition {raw:?} is not of the form COLUMN=VALUE");
  };
  Ok((column.trim().to_owned(), parse_value(value)?))
}

/// A column declaration: its name, type, and whether it is NOT NULL and
/// UNIQUE.
pub struct ColumnSpec {
  pub name:        String,
  pub column_type: String,
  pub not_null:    bool,
  pub unique:      bool,
}

pub fn parse_column(raw: &str) -> anyhow::Result<ColumnSpec> {
  let mut parts = raw.split(':').map(str::trim);
  let (Some(name), Some(column_type)) = (parts.next(), parts.next()) else {
    bail!("column {raw:?} is not of the form NAME:TYPE");
  };
  let mut col = ColumnSpec {
    name:        name.to_owned(),
    column_type: column_type.to_owned(),
    not_null:    false,
    unique:      false,
  };
  for flag in parts {
    match flag.to_ascii_lowercase().as_str() {
      "not_null" => col.not_null = true,
      "unique" => col.unique = true,
      other => bail!("unknown column flag {other:?} in {raw:?}"),
    }
  }
  Ok(col)
}

pub async fn run(
  command:    Command,
  save:       &SaveDir,
  host:       &DatabaseHost,
  peripheral: &DatabasePeripheral,
) -> anyhow::Result<serde_json::Value> {
  let out = match command {
    Command::Info => {
      let inserted = peripheral.is_disk_inserted()?;
      if inserted {
        json!({
          "inserted": true,
          "id":       peripheral.database_id()?,
          "name":     peripheral.database_name()?,
        })
      } else {
        json!({ "inserted": false })
      }
    }
    Command::Insert { id, name } => {
      if host.is_disk_inserted() {
        bail!("the slot is already occupied");
      }
      let stack = match id {
        Some(id) => {
          save
            .reserve(DATABASE_KIND, id)
            .with_context(|| format!("cannot use database id {id}"))?;
          ItemStack::disk_with_id(id)
        }
        None => ItemStack::disk(),
      };
      if host.insert_disk(stack).is_some() {
        bail!("the slot is already occupied");
      }
      if let Some(name) = name {
        peripheral.set_database_name(&name)?;
      }
      json!({ "id": peripheral.database_id()? })
    }
    Command::Eject => match host.eject_disk() {
      Some(stack) => serde_json::to_value(stack)?,
      None => bail!("{}", diskdb_peripheral::Error::NoDiskInserted),
    },
    Command::Rename { name } => {
      peripheral.set_database_name(&name)?;
      json!({ "name": name })
    }
    Command::Sql { sql } => serde_json::to_value(peripheral.execute_sql(&sql).await?)?,
    Command::Statement { sql, params } => {
      let mut stmt = peripheral.prepare_statement(sql);
      for (i, raw) in params.iter().enumerate() {
        stmt.set_parameter(i as i64 + 1, parse_value(raw)?)?;
      }
      serde_json::to_value(stmt.execute().await?)?
    }
    Command::InsertRow { table, values } => {
      let mut insert = peripheral.prepare_insert(&table)?;
      for raw in &values {
        let (column, value) = parse_condition(raw)?;
        insert.add_value(&column, value)?;
      }
      serde_json::to_value(insert.execute().await?)?
    }
    Command::CreateTable { table, columns, primary_key, auto_increment } => {
      let mut create = peripheral.prepare_table_creation(&table)?;
      for raw in &columns {
        let col = parse_column(raw)?;
        create.add_column_with(&col.name, &col.column_type, col.not_null, col.unique)?;
      }
      if let Some(key) = primary_key {
        create.set_primary_key(&key, auto_increment)?;
      }
      serde_json::to_value(create.execute().await?)?
    }
    Command::Select { table, conditions } => {
      let mut select = peripheral.prepare_select(&table)?;
      for raw in &conditions {
        let (column, value) = parse_condition(raw)?;
        select.add_condition(&column, value)?;
      }
      serde_json::to_value(select.execute().await?)?
    }
    Command::Delete { table, conditions } => {
      let mut delete = peripheral.prepare_delete(&table)?;
      for raw in &conditions {
        let (column, value) = parse_condition(raw)?;
        delete.add_condition(&column, value)?;
      }
      serde_json::to_value(delete.execute().await?)?
    }
  };
  Ok(out)
}
