//! Persistence gateway contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the single connection to the todos store.
//! - Provide list/todo CRUD over `lists` and `todos`.
//! - Normalize query results into `List`/`Todo` records.
//!
//! # Invariants
//! - Statement text and parameters go to the `QueryLogger` before execution.
//! - List reads compute `todos_count`/`todos_remaining` in one joined query.
//! - `todos_remaining` uses the same truth markers as `decode_bool`.
//! - Todo mutations always match on both `list_id` and `id`.
//! - `delete_list` removes a list and its todos atomically.

use crate::config::DbConfig;
use crate::db::schema::{table_exists, table_has_column, REQUIRED_COLUMNS};
use crate::db::{open_target, DbError};
use crate::decode::{decode_id, encode_bool, list_from_row, todo_from_row, DecodeError};
use crate::logging::sanitize_message;
use crate::model::list::{List, ListId};
use crate::model::todo::{Todo, TodoId};
use crate::repo::result_set::ResultSet;
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_LOGGED_PARAM_CHARS: usize = 120;

const LIST_SELECT_SQL: &str = "SELECT
    lists.id,
    lists.name,
    count(todos.id) AS todos_count,
    count(todos.id) - count(
        CASE WHEN lower(trim(CAST(todos.complete AS TEXT))) IN ('1', 't', 'true') THEN 1 END
    ) AS todos_remaining
FROM lists
LEFT OUTER JOIN todos ON lists.id = todos.list_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for gateway construction and list/todo operations.
#[derive(Debug)]
pub enum RepoError {
    /// Connection, configuration or statement failure from the store.
    Db(DbError),
    /// Caller-provided connection lacks a table the gateway uses.
    MissingRequiredTable(&'static str),
    /// Caller-provided connection lacks a column the gateway uses.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A stored value could not be decoded into a record field.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DecodeError> for RepoError {
    fn from(value: DecodeError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Sink for executed statements, supplied by the hosting application.
pub trait QueryLogger {
    fn info(&self, message: &str);
}

impl<T: QueryLogger + ?Sized> QueryLogger for &T {
    fn info(&self, message: &str) {
        (**self).info(message);
    }
}

/// Forwards statement logs to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl QueryLogger for LogFacade {
    fn info(&self, message: &str) {
        info!(target: "todos_core::query", "{message}");
    }
}

/// Data access contract for lists and their todos.
pub trait TodoRepository {
    /// Returns the list with its todo counts, or `None` when no list has `list_id`.
    fn find_list(&self, list_id: ListId) -> RepoResult<Option<List>>;
    /// Returns every list with its todo counts, ordered by name.
    fn all_lists(&self) -> RepoResult<Vec<List>>;
    /// Inserts a list and returns its storage-assigned id.
    fn create_new_list(&self, name: &str) -> RepoResult<ListId>;
    /// Deletes a list and its todos; returns the number of lists removed.
    fn delete_list(&self, list_id: ListId) -> RepoResult<usize>;
    /// Renames a list; returns the number of lists changed.
    fn update_list_name(&self, list_id: ListId, name: &str) -> RepoResult<usize>;
    /// Inserts an incomplete todo under `list_id` and returns its id.
    fn create_new_todo(&self, list_id: ListId, name: &str) -> RepoResult<TodoId>;
    /// Deletes the todo matching both ids; returns the number removed.
    fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> RepoResult<usize>;
    /// Sets the completion flag of the todo matching both ids.
    fn update_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        complete: bool,
    ) -> RepoResult<usize>;
    /// Marks every todo under `list_id` complete; returns the number touched.
    fn mark_all_todos_complete(&self, list_id: ListId) -> RepoResult<usize>;
    /// Returns the todos of `list_id` in id order.
    fn find_todos(&self, list_id: ListId) -> RepoResult<Vec<Todo>>;
}

/// SQLite-backed gateway holding exactly one connection.
///
/// Not meant for concurrent use; callers serialize access.
pub struct PersistenceGateway<L: QueryLogger = LogFacade> {
    conn: Connection,
    logger: L,
}

impl<L: QueryLogger> PersistenceGateway<L> {
    /// Opens the store `config` points at and installs the schema if absent.
    ///
    /// # Errors
    /// - `RepoError::Db(DbError::Config(_))` when `config` does not resolve.
    /// - `RepoError::Db(DbError::Sqlite(_))` when the store cannot be opened.
    pub fn connect(config: &DbConfig, logger: L) -> RepoResult<Self> {
        let target = config.target().map_err(DbError::from)?;
        let conn = match open_target(&target) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=gateway_connect module=repo status=error environment={} target={} error={}",
                    config.environment.as_str(),
                    target,
                    err
                );
                return Err(err.into());
            }
        };

        info!(
            "event=gateway_connect module=repo status=ok environment={} target={}",
            config.environment.as_str(),
            target
        );
        Ok(Self { conn, logger })
    }

    /// Wraps an already open connection whose schema the caller manages.
    ///
    /// Enables foreign keys and verifies the required tables and columns
    /// without creating anything.
    pub fn from_connection(conn: Connection, logger: L) -> RepoResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        ensure_schema_ready(&conn)?;
        Ok(Self { conn, logger })
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Runs one parameterized statement and returns its rows as text.
    pub fn query(&self, sql: &str, params: &[Value]) -> RepoResult<ResultSet> {
        run_query(&self.conn, &self.logger, sql, params)
    }

    /// Closes the connection.
    pub fn disconnect(self) -> RepoResult<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        info!("event=db_close module=repo status=ok");
        Ok(())
    }
}

impl<L: QueryLogger> TodoRepository for PersistenceGateway<L> {
    fn find_list(&self, list_id: ListId) -> RepoResult<Option<List>> {
        let result = self.query(
            &format!("{LIST_SELECT_SQL} WHERE lists.id = ?1 GROUP BY lists.id;"),
            &[Value::Integer(list_id)],
        )?;

        match result.first() {
            Some(row) => Ok(Some(list_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn all_lists(&self) -> RepoResult<Vec<List>> {
        let result = self.query(
            &format!("{LIST_SELECT_SQL} GROUP BY lists.id ORDER BY lists.name COLLATE NOCASE, lists.id;"),
            &[],
        )?;

        result
            .iter()
            .map(|row| list_from_row(row).map_err(RepoError::from))
            .collect()
    }

    fn create_new_list(&self, name: &str) -> RepoResult<ListId> {
        let result = self.query(
            "INSERT INTO lists (name) VALUES (?1) RETURNING id;",
            &[Value::Text(name.to_string())],
        )?;
        returned_id(&result)
    }

    fn delete_list(&self, list_id: ListId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        run_execute(
            &tx,
            &self.logger,
            "DELETE FROM todos WHERE list_id = ?1;",
            &[Value::Integer(list_id)],
        )?;
        let deleted = run_execute(
            &tx,
            &self.logger,
            "DELETE FROM lists WHERE id = ?1;",
            &[Value::Integer(list_id)],
        )?;
        tx.commit()?;
        Ok(deleted)
    }

    fn update_list_name(&self, list_id: ListId, name: &str) -> RepoResult<usize> {
        self.execute(
            "UPDATE lists SET name = ?2 WHERE id = ?1;",
            &[Value::Integer(list_id), Value::Text(name.to_string())],
        )
    }

    fn create_new_todo(&self, list_id: ListId, name: &str) -> RepoResult<TodoId> {
        let result = self.query(
            "INSERT INTO todos (name, list_id, complete) VALUES (?2, ?1, ?3) RETURNING id;",
            &[
                Value::Integer(list_id),
                Value::Text(name.to_string()),
                Value::Integer(encode_bool(false)),
            ],
        )?;
        returned_id(&result)
    }

    fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> RepoResult<usize> {
        self.execute(
            "DELETE FROM todos WHERE list_id = ?1 AND id = ?2;",
            &[Value::Integer(list_id), Value::Integer(todo_id)],
        )
    }

    fn update_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        complete: bool,
    ) -> RepoResult<usize> {
        self.execute(
            "UPDATE todos SET complete = ?3 WHERE list_id = ?1 AND id = ?2;",
            &[
                Value::Integer(list_id),
                Value::Integer(todo_id),
                Value::Integer(encode_bool(complete)),
            ],
        )
    }

    fn mark_all_todos_complete(&self, list_id: ListId) -> RepoResult<usize> {
        self.execute(
            "UPDATE todos SET complete = ?2 WHERE list_id = ?1;",
            &[Value::Integer(list_id), Value::Integer(encode_bool(true))],
        )
    }

    fn find_todos(&self, list_id: ListId) -> RepoResult<Vec<Todo>> {
        let result = self.query(
            "SELECT id, list_id, name, complete FROM todos WHERE list_id = ?1 ORDER BY id;",
            &[Value::Integer(list_id)],
        )?;

        result
            .iter()
            .map(|row| todo_from_row(row).map_err(RepoError::from))
            .collect()
    }
}

impl<L: QueryLogger> PersistenceGateway<L> {
    fn execute(&self, sql: &str, params: &[Value]) -> RepoResult<usize> {
        run_execute(&self.conn, &self.logger, sql, params)
    }
}

fn run_query<L: QueryLogger + ?Sized>(
    conn: &Connection,
    logger: &L,
    sql: &str,
    params: &[Value],
) -> RepoResult<ResultSet> {
    logger.info(&describe_statement(sql, params));
    let mut stmt = conn.prepare(sql)?;
    let result = ResultSet::collect(&mut stmt, params_from_iter(params.iter()))?;
    Ok(result)
}

fn run_execute<L: QueryLogger + ?Sized>(
    conn: &Connection,
    logger: &L,
    sql: &str,
    params: &[Value],
) -> RepoResult<usize> {
    logger.info(&describe_statement(sql, params));
    let changed = conn.execute(sql, params_from_iter(params.iter()))?;
    Ok(changed)
}

fn returned_id(result: &ResultSet) -> RepoResult<i64> {
    let row = result
        .first()
        .ok_or_else(|| RepoError::InvalidData("insert returned no id".to_string()))?;
    Ok(decode_id(row, "id")?)
}

fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

/// Renders a statement log line: collapsed SQL plus bound parameter values.
fn describe_statement(sql: &str, params: &[Value]) -> String {
    let sql = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    let params = params.iter().map(render_param).collect::<Vec<_>>().join(", ");
    format!("event=db_query module=repo sql={sql} params=[{params}]")
}

fn render_param(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(number) => number.to_string(),
        Value::Real(number) => number.to_string(),
        Value::Text(text) => format!("'{}'", sanitize_message(text, MAX_LOGGED_PARAM_CHARS)),
        Value::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    }
}
