//! The database peripheral as seen by scripted callers.
//!
//! A [`DatabaseHost`] is the in-world device holding one disk. Hosts live in
//! a [`HostRegistry`]; callers never hold a host directly but a
//! [`DatabasePeripheral`], which names its host by a generation-checked
//! [`HostHandle`] and re-resolves it on every call. The statement builders in
//! [`statement`] are created from a peripheral and compile caller input into
//! one parameterised statement each.
//!
//! # Example
//!
//! ```rust,ignore
//! let peripheral = DatabasePeripheral::new(registry, gateway, handle);
//!
//! let mut insert = peripheral.prepare_insert("users")?;
//! insert.add_value("name", "ada")?;
//! insert.execute().await?;
//! ```

pub mod error;
pub mod host;
pub mod peripheral;
pub mod registry;
pub mod statement;

pub use error::{Error, Result};
pub use host::{CallerId, DatabaseHost};
pub use peripheral::DatabasePeripheral;
pub use registry::{HostHandle, HostRegistry};
pub use statement::{Compiled, Delete, Insert, PreparedStatement, Select, TableCreator};

#[cfg(test)]
mod tests;
