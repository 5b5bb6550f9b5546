//! `diskdb` — drive a database host from the command line.
//!
//! Loads the host's slot from `slot_file`, runs one command through the
//! same peripheral interface scripted callers use, prints the result as
//! JSON and writes the slot back.

mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use diskdb_core::slot::InventorySlot;
use diskdb_peripheral::{CallerId, DatabaseHost, DatabasePeripheral, HostRegistry};
use diskdb_store_sqlite::{ExecutionGateway, SaveDir};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, config::CliConfig};

/// The command line attaches as this caller for the duration of a command.
const CLI_CALLER: CallerId = 0;

#[derive(Parser)]
#[command(author, version, about = "Disk-backed SQLite databases")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "diskdb.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let save = Arc::new(SaveDir::new(cfg.save_dir()));
  let host = Arc::new(DatabaseHost::new(Arc::clone(&save)));

  let slot_file = cfg.slot_file();
  if slot_file.exists() {
    let bytes = std::fs::read(&slot_file)
      .with_context(|| format!("failed to read slot {slot_file:?}"))?;
    let slot: InventorySlot = serde_json::from_slice(&bytes)
      .with_context(|| format!("failed to parse slot {slot_file:?}"))?;
    host.restore(slot);
  }

  let registry = Arc::new(HostRegistry::new());
  let handle = registry.insert(Arc::clone(&host));
  let peripheral =
    DatabasePeripheral::new(Arc::clone(&registry), Arc::new(ExecutionGateway::new()), handle);

  peripheral.attach(CLI_CALLER)?;
  let outcome = commands::run(cli.command, &save, &host, &peripheral).await;
  peripheral.detach(CLI_CALLER)?;

  // Persist the slot even when the command failed: a lazily allocated id
  // must not be lost.
  if let Some(parent) = slot_file.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&slot_file, serde_json::to_vec_pretty(&host.snapshot())?)
    .with_context(|| format!("failed to write slot {slot_file:?}"))?;
  registry.remove(handle);

  let out = outcome?;
  println!("{}", serde_json::to_string_pretty(&out)?);
  Ok(())
}
