//! Persistence core for the todos web application.
//! Lists and their todo items live in SQLite; this crate is the only code
//! that talks to the store.

pub mod config;
pub mod db;
pub mod decode;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, DbConfig, DbTarget, Environment};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::list::{List, ListId};
pub use model::todo::{Todo, TodoId};
pub use repo::{
    LogFacade, PersistenceGateway, QueryLogger, RepoError, RepoResult, ResultSet, TextRow,
    TodoRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
