//! SQLite connection bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection the gateway owns.
//! - Install the `lists`/`todos` schema when it is absent.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, so deleting a list
//!   cascades to its todos.
//! - Schema installation is idempotent; there is no version tracking.

use crate::config::ConfigError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_target};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Config(ConfigError),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid database config: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ConfigError> for DbError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
