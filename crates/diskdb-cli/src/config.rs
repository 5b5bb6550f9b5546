//! CLI configuration, read from an optional TOML file and `DISKDB_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// Root of the world whose save directory holds the databases.
  #[serde(default = "default_world_dir")]
  pub world_dir: PathBuf,
  /// Where the host's slot is persisted between runs; defaults to
  /// `<world_dir>/slot.json`.
  #[serde(default)]
  pub slot_file: Option<PathBuf>,
}

fn default_world_dir() -> PathBuf { PathBuf::from("world") }

impl CliConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DISKDB"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;

    cfg.world_dir = expand_tilde(&cfg.world_dir);
    cfg.slot_file = cfg.slot_file.as_deref().map(expand_tilde);
    Ok(cfg)
  }

  pub fn save_dir(&self) -> PathBuf { self.world_dir.join("save") }

  pub fn slot_file(&self) -> PathBuf {
    self
      .slot_file
      .clone()
      .unwrap_or_else(|| self.world_dir.join("slot.json"))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
