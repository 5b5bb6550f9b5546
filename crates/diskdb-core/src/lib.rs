//! Core types for the disk-backed database peripheral.
//!
//! This crate is free of any database engine dependency. It owns the scalar
//! value model that crosses the scripting boundary, the identifier rules that
//! keep caller-supplied names out of SQL injection territory, and the
//! single-slot disk inventory together with its persistent identity.

pub mod column;
pub mod disk;
pub mod error;
pub mod ident;
pub mod identity;
pub mod result;
pub mod slot;
pub mod value;

pub use error::{Error, Result};
pub use identity::{IdAllocator, DATABASE_KIND, UNASSIGNED_ID};
pub use result::{ResultSet, Row};
pub use value::Value;
