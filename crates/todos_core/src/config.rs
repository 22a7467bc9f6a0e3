//! Connection configuration for the persistence gateway.
//!
//! # Responsibility
//! - Describe which store the gateway connects to, per execution environment.
//! - Resolve a connection string into a concrete SQLite target.
//!
//! # Invariants
//! - Production always requires an explicit `database_url`.
//! - Development always resolves to the fixed local database file.
//! - The gateway never reads process environment itself; callers build a
//!   `DbConfig` (optionally via `DbConfig::from_env`) and pass it in.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the execution environment.
pub const ENVIRONMENT_VAR: &str = "TODOS_ENV";
/// Environment variable holding the production connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Database file used outside production.
pub const DEV_DATABASE_NAME: &str = "todos.db";

/// Execution environment of the hosting web application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Concrete SQLite location derived from a `DbConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

impl Display for DbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingDatabaseUrl,
    EmptyDatabaseUrl,
    UnknownEnvironment(String),
    UnsupportedScheme(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDatabaseUrl => {
                write!(f, "production requires `{DATABASE_URL_VAR}` to be set")
            }
            Self::EmptyDatabaseUrl => f.write_str("database url cannot be empty"),
            Self::UnknownEnvironment(value) => write!(
                f,
                "unknown environment `{value}`; expected production|development"
            ),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported database url scheme `{scheme}`; expected sqlite")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection settings handed to `PersistenceGateway::connect`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbConfig {
    pub environment: Environment,
    /// Connection string; only consulted in production.
    pub database_url: Option<String>,
}

impl DbConfig {
    pub fn production(database_url: impl Into<String>) -> Self {
        Self {
            environment: Environment::Production,
            database_url: Some(database_url.into()),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database_url: None,
        }
    }

    /// Builds a config from `TODOS_ENV` and `DATABASE_URL`.
    ///
    /// A missing `TODOS_ENV` means development.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENVIRONMENT_VAR) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Environment::default(),
        };

        Ok(Self {
            environment,
            database_url: lookup(DATABASE_URL_VAR),
        })
    }

    /// Resolves the store this config points at.
    ///
    /// # Errors
    /// - `MissingDatabaseUrl` in production without a url.
    /// - `EmptyDatabaseUrl` when the url has no location after its scheme.
    /// - `UnsupportedScheme` for `scheme://` urls other than `sqlite://`.
    pub fn target(&self) -> Result<DbTarget, ConfigError> {
        match self.environment {
            Environment::Development => Ok(DbTarget::File(PathBuf::from(DEV_DATABASE_NAME))),
            Environment::Production => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or(ConfigError::MissingDatabaseUrl)?;
                parse_database_url(url)
            }
        }
    }
}

fn parse_database_url(url: &str) -> Result<DbTarget, ConfigError> {
    let trimmed = url.trim();
    if let Some((scheme, _)) = trimmed.split_once("://") {
        if scheme != "sqlite" {
            return Err(ConfigError::UnsupportedScheme(scheme.to_string()));
        }
    }
    let location = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    match location {
        "" => Err(ConfigError::EmptyDatabaseUrl),
        ":memory:" => Ok(DbTarget::Memory),
        path => Ok(DbTarget::File(PathBuf::from(path))),
    }
}
