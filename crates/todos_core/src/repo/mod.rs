//! Repository layer: the persistence gateway over `lists` and `todos`.
//!
//! # Responsibility
//! - Define the list/todo data access contract used by the web layer.
//! - Keep SQL text, parameter binding and row decoding behind that contract.
//!
//! # Invariants
//! - Every statement is parameterized and logged before it runs.
//! - Store errors are returned unchanged inside `RepoError::Db`.
//! - "No such row" is an `Option::None` or a zero row count, never an error.

pub mod persistence;
pub mod result_set;

pub use persistence::{
    LogFacade, PersistenceGateway, QueryLogger, RepoError, RepoResult, TodoRepository,
};
pub use result_set::{ResultSet, TextRow};
