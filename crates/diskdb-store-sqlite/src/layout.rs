//! On-disk layout of a world's database files.
//!
//! ```text
//! <root>/ids.json                        last id handed out, per kind
//! <root>/database/<id>/database.sqlite   one file per disk id
//! ```

use std::{
  collections::BTreeMap,
  fs, io,
  path::{Path, PathBuf},
  sync::Mutex,
};

use diskdb_core::{IdAllocator, DATABASE_KIND};
use tracing::debug;

use crate::Result;

const IDS_FILE: &str = "ids.json";
const DATABASE_FILE: &str = "database.sqlite";

/// World-scoped save directory: allocates numbered subdirectories and
/// resolves database ids to files.
#[derive(Debug)]
pub struct SaveDir {
  root: PathBuf,
  /// Serialises read-modify-write cycles of `ids.json`.
  lock: Mutex<()>,
}

impl SaveDir {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into(), lock: Mutex::new(()) }
  }

  pub fn root(&self) -> &Path { &self.root }

  fn numbered_dir(&self, kind: &str, id: i32) -> PathBuf {
    self.root.join(kind).join(id.to_string())
  }

  /// Path of the database file for `id`, creating its directory if needed.
  pub fn database_file(&self, id: i32) -> Result<PathBuf> {
    let dir = self.numbered_dir(DATABASE_KIND, id);
    fs::create_dir_all(&dir)?;
    Ok(dir.join(DATABASE_FILE))
  }

  /// Claim `id` for a disk that arrives with it already assigned, so the
  /// allocator never hands it out again.
  pub fn reserve(&self, kind: &str, id: i32) -> diskdb_core::Result<()> {
    if id < 0 {
      return Err(diskdb_core::Error::Allocation(format!("{kind} id {id} is negative")));
    }
    let _guard = self
      .lock
      .lock()
      .map_err(|_| diskdb_core::Error::Allocation("id counter lock poisoned".into()))?;

    fs::create_dir_all(self.numbered_dir(kind, id))?;
    let mut ids = self.read_ids()?;
    if ids.get(kind).is_none_or(|last| *last < id) {
      ids.insert(kind.to_owned(), id);
      self.write_ids(&ids)?;
    }

    debug!(kind, id, root = %self.root.display(), "reserved save directory");
    Ok(())
  }

  fn read_ids(&self) -> diskdb_core::Result<BTreeMap<String, i32>> {
    match fs::read(self.root.join(IDS_FILE)) {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
      Err(e) => Err(e.into()),
    }
  }

  fn write_ids(&self, ids: &BTreeMap<String, i32>) -> diskdb_core::Result<()> {
    let tmp = self.root.join(format!("{IDS_FILE}.tmp"));
    fs::write(&tmp, serde_json::to_vec_pretty(ids)?)?;
    fs::rename(tmp, self.root.join(IDS_FILE))?;
    Ok(())
  }
}

impl IdAllocator for SaveDir {
  fn allocate(&self, kind: &str) -> diskdb_core::Result<i32> {
    let _guard = self
      .lock
      .lock()
      .map_err(|_| diskdb_core::Error::Allocation("id counter lock poisoned".into()))?;

    fs::create_dir_all(&self.root)?;
    let mut ids = self.read_ids()?;

    let mut id = match ids.get(kind) {
      Some(last) => last
        .checked_add(1)
        .ok_or_else(|| diskdb_core::Error::Allocation(format!("{kind} ids exhausted")))?,
      None => 0,
    };
    // Directories left behind by a lost counter file are never reused.
    while self.numbered_dir(kind, id).exists() {
      id = id
        .checked_add(1)
        .ok_or_else(|| diskdb_core::Error::Allocation(format!("{kind} ids exhausted")))?;
    }

    fs::create_dir_all(self.numbered_dir(kind, id))?;
    ids.insert(kind.to_owned(), id);
    self.write_ids(&ids)?;

    debug!(kind, id, root = %self.root.display(), "allocated save directory");
    Ok(id)
  }
}
