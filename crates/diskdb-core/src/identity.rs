//! Persistent identity of the disk held in an [`InventorySlot`].
//!
//! The id is what ties a physical disk to its database file, so it is only
//! ever replaced when a caller explicitly forces it.

use tracing::debug;

use crate::{slot::InventorySlot, Error, Result};

/// Save-directory kind under which database ids are allocated.
pub const DATABASE_KIND: &str = "database";

/// Returned by [`InventorySlot::read_id`] for a disk that has no id yet.
pub const UNASSIGNED_ID: i32 = -1;

/// Source of world-scoped unique ids.
///
/// Passed explicitly to the identity accessors rather than reached through
/// a global.
pub trait IdAllocator: Send + Sync {
  /// Allocate the next unused id of `kind`. Ids are never handed out twice.
  fn allocate(&self, kind: &str) -> Result<i32>;
}

impl InventorySlot {
  /// Give the inserted disk a fresh id.
  ///
  /// Returns `None` when there is no disk, or when the disk already has an
  /// id and `force` is false: callers read `None` as "nothing changed".
  /// Nothing is persisted if the allocator fails.
  pub fn assign_id(&mut self, allocator: &dyn IdAllocator, force: bool) -> Result<Option<i32>> {
    let Some(disk) = self.disk_mut() else {
      return Ok(None);
    };
    if !force && disk.data.database_id.is_some() {
      return Ok(None);
    }

    let id = allocator.allocate(DATABASE_KIND)?;
    if id < 0 {
      return Err(Error::Allocation(format!("allocator returned negative id {id}")));
    }

    debug!(id, force, "assigned database id to disk");
    disk.data.database_id = Some(id);
    Ok(Some(id))
  }

  /// Read the inserted disk's id.
  ///
  /// An unassigned disk reads as [`UNASSIGNED_ID`], unless `force` is set,
  /// in which case an id is allocated on the spot.
  pub fn read_id(&mut self, allocator: &dyn IdAllocator, force: bool) -> Result<Option<i32>> {
    let Some(current) = self.disk().map(|d| d.data.database_id) else {
      return Ok(None);
    };

    match current {
      Some(id) => Ok(Some(id)),
      None if force => self.assign_id(allocator, true),
      None => Ok(Some(UNASSIGNED_ID)),
    }
  }

  pub fn read_name(&self) -> Option<String> {
    self.disk().and_then(|d| d.data.database_name.clone())
  }

  pub fn write_name(&mut self, name: impl Into<String>) {
    if let Some(disk) = self.disk_mut() {
      disk.data.database_name = Some(name.into());
    }
  }
}
