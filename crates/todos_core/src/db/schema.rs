//! Schema script and introspection helpers.

use super::DbResult;
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables the gateway reads and writes, with the columns it relies on.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("lists", &["id", "name"]),
    ("todos", &["id", "name", "complete", "list_id"]),
];

/// Creates `lists`, `todos` and their index when missing.
pub fn apply_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(0)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
