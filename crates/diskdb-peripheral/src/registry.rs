//! Live hosts, addressed by generation-checked handles.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::host::DatabaseHost;

/// Names a host in a [`HostRegistry`].
///
/// A handle outlives its host harmlessly: once the host is removed the
/// entry's generation moves on and the handle never resolves again, even if
/// the index is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle {
  index:      u32,
  generation: u32,
}

struct Entry {
  generation: u32,
  host:       Option<Arc<DatabaseHost>>,
}

#[derive(Default)]
struct Inner {
  entries: Vec<Entry>,
  free:    Vec<u32>,
}

/// All hosts currently part of the world.
#[derive(Default)]
pub struct HostRegistry {
  inner: RwLock<Inner>,
}

impl HostRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&self, host: Arc<DatabaseHost>) -> HostHandle {
    let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    let inner = &mut *guard;

    let handle = if let Some(index) = inner.free.pop() {
      let entry = &mut inner.entries[index as usize];
      entry.host = Some(host);
      HostHandle { index, generation: entry.generation }
    } else {
      let index = inner.entries.len() as u32;
      inner.entries.push(Entry { generation: 0, host: Some(host) });
      HostHandle { index, generation: 0 }
    };

    debug!(?handle, "registered database host");
    handle
  }

  /// Resolve a handle to its host, if the host is still registered.
  pub fn get(&self, handle: HostHandle) -> Option<Arc<DatabaseHost>> {
    let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
    inner
      .entries
      .get(handle.index as usize)
      .filter(|e| e.generation == handle.generation)
      .and_then(|e| e.host.clone())
  }

  /// Take a host out of the world. The host is marked removed, so builders
  /// still holding it through an earlier lookup see it as gone too.
  pub fn remove(&self, handle: HostHandle) -> Option<Arc<DatabaseHost>> {
    let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    let inner = &mut *guard;

    let entry = inner
      .entries
      .get_mut(handle.index as usize)
      .filter(|e| e.generation == handle.generation)?;
    let host = entry.host.take()?;
    entry.generation = entry.generation.wrapping_add(1);
    inner.free.push(handle.index);

    host.mark_removed();
    debug!(?handle, "unregistered database host");
    Some(host)
  }

  pub fn len(&self) -> usize {
    let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
    inner.entries.iter().filter(|e| e.host.is_some()).count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}
