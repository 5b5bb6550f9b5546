//! Disk items and the persisted data attached to them.

use serde::{Deserialize, Serialize};

/// What kind of item a stack holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
  DatabaseDisk,
  Other(String),
}

/// Data persisted on the item itself.
///
/// Because it travels with the item, a duplicated disk carries the same id
/// as its original until one of them is force-reassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskData {
  #[serde(rename = "databaseId", default, skip_serializing_if = "Option::is_none")]
  pub database_id:   Option<i32>,
  #[serde(rename = "databaseName", default, skip_serializing_if = "Option::is_none")]
  pub database_name: Option<String>,
}

/// A stack of items of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
  pub kind:  ItemKind,
  pub count: u32,
  #[serde(default)]
  pub data:  DiskData,
}

impl ItemStack {
  /// A single blank database disk.
  pub fn disk() -> Self {
    Self { kind: ItemKind::DatabaseDisk, count: 1, data: DiskData::default() }
  }

  /// A single database disk already carrying an id.
  pub fn disk_with_id(id: i32) -> Self {
    let mut stack = Self::disk();
    stack.data.database_id = Some(id);
    stack
  }

  pub fn other(name: impl Into<String>, count: u32) -> Self {
    Self { kind: ItemKind::Other(name.into()), count, data: DiskData::default() }
  }

  pub fn is_disk(&self) -> bool { self.kind == ItemKind::DatabaseDisk }

  pub fn is_empty(&self) -> bool { self.count == 0 }

  /// Split `amount` items off this stack, leaving the rest behind.
  pub fn split(&mut self, amount: u32) -> Self {
    let taken = amount.min(self.count);
    self.count -= taken;
    Self { kind: self.kind.clone(), count: taken, data: self.data.clone() }
  }
}
