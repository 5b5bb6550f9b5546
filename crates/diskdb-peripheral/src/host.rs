//! [`DatabaseHost`] — the in-world device that owns a disk slot.

use std::{
  collections::HashSet,
  path::PathBuf,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
  },
};

use diskdb_core::{disk::ItemStack, slot::InventorySlot, IdAllocator};
use diskdb_store_sqlite::SaveDir;
use tracing::debug;

use crate::{Error, Result};

/// Identifies an attached scripted caller (a computer).
pub type CallerId = u32;

/// A database device holding at most one disk.
///
/// Liveness is written by the world side through [`DatabaseHost::mark_removed`]
/// and read by callers before and after every statement. The slot and the
/// set of attached callers each sit behind their own mutex since callers
/// attach and detach concurrently with world updates.
pub struct DatabaseHost {
  slot:        Mutex<InventorySlot>,
  removed:     AtomicBool,
  callers:     Mutex<HashSet<CallerId>>,
  switched_on: AtomicBool,
  allocator:   Arc<dyn IdAllocator>,
  save_dir:    Arc<SaveDir>,
}

impl DatabaseHost {
  /// A host allocating ids from its own save directory.
  pub fn new(save_dir: Arc<SaveDir>) -> Self {
    let allocator: Arc<dyn IdAllocator> = save_dir.clone();
    Self::with_allocator(save_dir, allocator)
  }

  pub fn with_allocator(save_dir: Arc<SaveDir>, allocator: Arc<dyn IdAllocator>) -> Self {
    Self {
      slot: Mutex::new(InventorySlot::new()),
      removed: AtomicBool::new(false),
      callers: Mutex::new(HashSet::new()),
      switched_on: AtomicBool::new(false),
      allocator,
      save_dir,
    }
  }

  fn slot(&self) -> MutexGuard<'_, InventorySlot> {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner)
  }

  // ── Liveness ──────────────────────────────────────────────────────────────

  pub fn is_removed(&self) -> bool { self.removed.load(Ordering::Acquire) }

  pub fn mark_removed(&self) {
    if !self.removed.swap(true, Ordering::AcqRel) {
      debug!("database host removed from world");
    }
  }

  // ── Attached callers ──────────────────────────────────────────────────────

  pub fn attach(&self, caller: CallerId) {
    let mut callers = self.callers.lock().unwrap_or_else(PoisonError::into_inner);
    callers.insert(caller);
    self.refresh(&callers);
  }

  pub fn detach(&self, caller: CallerId) {
    let mut callers = self.callers.lock().unwrap_or_else(PoisonError::into_inner);
    callers.remove(&caller);
    self.refresh(&callers);
  }

  pub fn attached_count(&self) -> usize {
    self.callers.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// On while at least one caller is attached.
  pub fn is_switched_on(&self) -> bool { self.switched_on.load(Ordering::Acquire) }

  /// Must be called with the caller set locked.
  fn refresh(&self, callers: &HashSet<CallerId>) {
    if self.is_removed() {
      return;
    }
    let on = !callers.is_empty();
    if self.switched_on.swap(on, Ordering::AcqRel) != on {
      debug!(on, callers = callers.len(), "database host switched");
    }
  }

  // ── Slot ──────────────────────────────────────────────────────────────────

  /// Offer a stack to the slot; returns what was not accepted.
  pub fn insert_disk(&self, stack: ItemStack) -> Option<ItemStack> {
    self.slot().insert(stack, false)
  }

  pub fn eject_disk(&self) -> Option<ItemStack> { self.slot().extract(false) }

  /// Copy of the slot for persisting the host.
  pub fn snapshot(&self) -> InventorySlot { self.slot().clone() }

  /// Replace the slot with previously persisted contents.
  pub fn restore(&self, slot: InventorySlot) { *self.slot() = slot; }

  pub fn is_disk_inserted(&self) -> bool { self.slot().is_disk_inserted() }

  /// Give the inserted disk a new id; see [`InventorySlot::assign_id`].
  pub fn assign_database_id(&self, force: bool) -> diskdb_core::Result<Option<i32>> {
    self.slot().assign_id(self.allocator.as_ref(), force)
  }

  /// The inserted disk's id, allocating one if it has none yet.
  pub fn database_id(&self) -> diskdb_core::Result<Option<i32>> {
    self.slot().read_id(self.allocator.as_ref(), true)
  }

  pub fn database_name(&self) -> Option<String> { self.slot().read_name() }

  pub fn set_database_name(&self, name: &str) { self.slot().write_name(name) }

  /// Database file backing the inserted disk.
  ///
  /// Failing to obtain an id here is never the caller's fault, so every
  /// failure is internal.
  pub fn database_file(&self) -> Result<PathBuf> {
    let id = self
      .database_id()?
      .ok_or_else(|| Error::internal("no database id for inserted disk"))?;
    Ok(self.save_dir.database_file(id)?)
  }
}
