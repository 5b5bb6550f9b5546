//! SQLite backend for disk databases.
//!
//! Each disk id owns one database file inside the world save directory.
//! [`ExecutionGateway`] runs statements against those files through
//! [`tokio_rusqlite`] so engine I/O stays off the async runtime, and
//! [`SaveDir`] hands out the ids and lays out the files.

mod encode;
mod gateway;
mod layout;

pub mod error;

pub use error::{Error, Result};
pub use gateway::ExecutionGateway;
pub use layout::SaveDir;
