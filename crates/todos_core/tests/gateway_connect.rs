use rusqlite::Connection;
use todos_core::db::{open_db, DbError};
use todos_core::{
    ConfigError, DbConfig, Environment, LogFacade, PersistenceGateway, RepoError, TodoRepository,
};

#[test]
fn production_connects_to_database_url_and_persists_across_reconnects() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("todos.db").display());
    let config = DbConfig::production(url);

    let repo = PersistenceGateway::connect(&config, LogFacade).unwrap();
    let list_id = repo.create_new_list("Persistent").unwrap();
    repo.create_new_todo(list_id, "survive restart").unwrap();
    repo.disconnect().unwrap();

    let reopened = PersistenceGateway::connect(&config, LogFacade).unwrap();
    let list = reopened.find_list(list_id).unwrap().unwrap();
    assert_eq!(list.name, "Persistent");
    assert_eq!(list.todos_count, 1);
    reopened.disconnect().unwrap();
}

#[test]
fn production_in_memory_url_gets_a_fresh_schema() {
    let repo = PersistenceGateway::connect(&DbConfig::production("sqlite::memory:"), LogFacade)
        .unwrap();
    assert!(repo.all_lists().unwrap().is_empty());
}

#[test]
fn production_without_database_url_fails_before_connecting() {
    let config = DbConfig {
        environment: Environment::Production,
        database_url: None,
    };

    let err = PersistenceGateway::connect(&config, LogFacade)
        .err()
        .expect("connect must fail without a url");
    assert!(matches!(
        err,
        RepoError::Db(DbError::Config(ConfigError::MissingDatabaseUrl))
    ));
}

#[test]
fn unopenable_database_is_a_fatal_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let url = dir
        .path()
        .join("missing-dir")
        .join("todos.db")
        .display()
        .to_string();

    let err = PersistenceGateway::connect(&DbConfig::production(url), LogFacade)
        .err()
        .expect("connect must fail for a path in a missing directory");
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
}

#[test]
fn open_db_enables_foreign_keys_and_creates_tables() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("todos.db")).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);

    for table in ["lists", "todos"] {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "table {table} does not exist");
    }
}

#[test]
fn from_connection_rejects_missing_tables() {
    let conn = Connection::open_in_memory().unwrap();

    let result = PersistenceGateway::from_connection(conn, LogFacade);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("lists"))));
}

#[test]
fn from_connection_rejects_missing_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE lists (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE todos (id INTEGER PRIMARY KEY, name TEXT NOT NULL, list_id INTEGER);",
    )
    .unwrap();

    let result = PersistenceGateway::from_connection(conn, LogFacade);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "complete"
        })
    ));
}

#[test]
fn from_connection_without_cascade_still_deletes_todos_with_list() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE lists (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
         CREATE TABLE todos (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             complete INTEGER NOT NULL DEFAULT 0,
             list_id INTEGER NOT NULL REFERENCES lists (id)
         );",
    )
    .unwrap();
    let repo = PersistenceGateway::from_connection(conn, LogFacade).unwrap();

    let list_id = repo.create_new_list("No cascade").unwrap();
    repo.create_new_todo(list_id, "orphan candidate").unwrap();

    assert_eq!(repo.delete_list(list_id).unwrap(), 1);
    assert!(repo.find_list(list_id).unwrap().is_none());
    assert!(repo.find_todos(list_id).unwrap().is_empty());
}

#[test]
fn failed_list_delete_rolls_back_todo_delete() {
    let conn = todos_core::db::open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER lists_locked BEFORE DELETE ON lists
         BEGIN
             SELECT RAISE(ABORT, 'lists are locked');
         END;",
    )
    .unwrap();
    let repo = PersistenceGateway::from_connection(conn, LogFacade).unwrap();

    let list_id = repo.create_new_list("Locked").unwrap();
    repo.create_new_todo(list_id, "must survive").unwrap();

    let err = repo.delete_list(list_id).unwrap_err();
    assert!(err.to_string().contains("lists are locked"));

    assert!(repo.find_list(list_id).unwrap().is_some());
    assert_eq!(repo.find_todos(list_id).unwrap().len(), 1);
}

#[test]
fn new_todo_is_incomplete_without_a_schema_default() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE lists (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
         CREATE TABLE todos (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             complete boolean,
             list_id INTEGER NOT NULL REFERENCES lists (id)
         );",
    )
    .unwrap();
    let repo = PersistenceGateway::from_connection(conn, LogFacade).unwrap();

    let list_id = repo.create_new_list("No default").unwrap();
    repo.create_new_todo(list_id, "Milk").unwrap();

    let todos = repo.find_todos(list_id).unwrap();
    assert_eq!(todos.len(), 1);
    assert!(!todos[0].complete);

    let list = repo.find_list(list_id).unwrap().unwrap();
    assert_eq!((list.todos_count, list.todos_remaining), (1, 1));
}
