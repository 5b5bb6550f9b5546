//! The single-item slot of a database host.

use serde::{Deserialize, Serialize};

use crate::disk::ItemStack;

/// Holds at most one database disk.
///
/// Mutated by whatever moves items in and out (players, automation); read
/// by the identity accessors in [`crate::identity`] and by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
  stack: Option<ItemStack>,
}

impl InventorySlot {
  pub fn new() -> Self { Self::default() }

  /// Always exactly one item.
  pub fn slot_limit(&self) -> u32 { 1 }

  /// Only database disks may enter the slot.
  pub fn is_item_valid(&self, stack: &ItemStack) -> bool { stack.is_disk() }

  pub fn stack(&self) -> Option<&ItemStack> { self.stack.as_ref() }

  pub(crate) fn disk(&self) -> Option<&ItemStack> {
    self.stack.as_ref().filter(|s| s.is_disk() && !s.is_empty())
  }

  pub(crate) fn disk_mut(&mut self) -> Option<&mut ItemStack> {
    self.stack.as_mut().filter(|s| s.is_disk() && !s.is_empty())
  }

  pub fn is_disk_inserted(&self) -> bool { self.disk().is_some() }

  /// Offer `stack` to the slot and return whatever was not accepted.
  ///
  /// Invalid items and an occupied slot both hand the stack back untouched.
  /// Otherwise one item is taken and the remainder (if any) is returned.
  /// With `simulate` the slot is left as it was.
  pub fn insert(&mut self, mut stack: ItemStack, simulate: bool) -> Option<ItemStack> {
    if stack.is_empty() {
      return None;
    }
    if !self.is_item_valid(&stack) || self.stack.is_some() {
      return Some(stack);
    }

    let accepted = stack.split(self.slot_limit());
    if !simulate {
      self.stack = Some(accepted);
    }
    (!stack.is_empty()).then_some(stack)
  }

  /// Take the held item out. With `simulate` the item stays in place and a
  /// copy is returned.
  pub fn extract(&mut self, simulate: bool) -> Option<ItemStack> {
    if simulate { self.stack.clone() } else { self.stack.take() }
  }
}
