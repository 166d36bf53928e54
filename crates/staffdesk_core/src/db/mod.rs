//! SQLite storage bootstrap, lifecycle guard and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the staff registry.
//! - Apply schema migrations in deterministic order.
//! - Own the release/commit/rollback helpers every operation ends with.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write registry data before migrations succeed.
//! - Release failures never replace an operation outcome.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod batch;
pub mod guard;
pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, SqliteStore, StoreAccess};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
