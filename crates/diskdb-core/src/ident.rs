//! Identifier rules for table and column names.
//!
//! Names cannot be bound as statement parameters, so they end up verbatim in
//! SQL text. Anything outside the pattern below is refused before it gets
//! that far.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z_][A-Za-z_#@$0-9]*$").expect("identifier pattern compiles")
});

/// Whether `name` may be used as a table or column name.
pub fn is_valid(name: &str) -> bool { IDENTIFIER.is_match(name) }

/// Reject `name` unless it matches the identifier pattern.
pub fn check_name(name: &str) -> Result<()> {
  if is_valid(name) {
    Ok(())
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}

/// Case-fold an identifier for use as a map key.
///
/// Identifiers are ASCII-only once validated, so ASCII lowercasing is
/// sufficient and matches SQLite's own case-insensitive name lookup.
pub fn fold(name: &str) -> String { name.to_ascii_lowercase() }
