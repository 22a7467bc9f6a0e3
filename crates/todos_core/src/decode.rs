//! Field decoders from text-encoded cells to typed records.
//!
//! # Responsibility
//! - Turn the text cells of a `TextRow` into `List` and `Todo` records.
//! - Keep one decoder per field kind so every cast is tested in one place.
//!
//! # Invariants
//! - Decoders reject malformed text instead of substituting defaults.
//! - `decode_bool(encode_bool(b)) == b` for every `b`.

use crate::model::list::List;
use crate::model::todo::Todo;
use crate::repo::result_set::TextRow;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    MissingColumn(String),
    NullValue(String),
    InvalidInteger { column: String, value: String },
    InvalidBool { column: String, value: String },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "column `{column}` missing from row"),
            Self::NullValue(column) => write!(f, "column `{column}` is NULL"),
            Self::InvalidInteger { column, value } => {
                write!(f, "invalid integer `{value}` in column `{column}`")
            }
            Self::InvalidBool { column, value } => {
                write!(f, "invalid boolean `{value}` in column `{column}`")
            }
        }
    }
}

impl Error for DecodeError {}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Returns the non-NULL text of `column`.
pub fn decode_text(row: &TextRow, column: &str) -> DecodeResult<String> {
    required(row, column).map(str::to_string)
}

/// Decodes a storage-assigned identifier.
pub fn decode_id(row: &TextRow, column: &str) -> DecodeResult<i64> {
    decode_integer(row, column)
}

/// Decodes an aggregate count. Counts are never negative.
pub fn decode_count(row: &TextRow, column: &str) -> DecodeResult<i64> {
    let value = decode_integer(row, column)?;
    if value < 0 {
        return Err(DecodeError::InvalidInteger {
            column: column.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Decodes a truth marker: `t`, `true`, `1` or `f`, `false`, `0`.
pub fn decode_bool(row: &TextRow, column: &str) -> DecodeResult<bool> {
    let raw = required(row, column)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Ok(true),
        "f" | "false" | "0" => Ok(false),
        _ => Err(DecodeError::InvalidBool {
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Storage encoding of a completion flag.
pub fn encode_bool(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Converts a `lists` row joined with its todo counts.
pub fn list_from_row(row: &TextRow) -> DecodeResult<List> {
    Ok(List {
        id: decode_id(row, "id")?,
        name: decode_text(row, "name")?,
        todos_count: decode_count(row, "todos_count")?,
        todos_remaining: decode_count(row, "todos_remaining")?,
    })
}

/// Converts a `todos` row.
pub fn todo_from_row(row: &TextRow) -> DecodeResult<Todo> {
    Ok(Todo {
        id: decode_id(row, "id")?,
        list_id: decode_id(row, "list_id")?,
        name: decode_text(row, "name")?,
        complete: decode_bool(row, "complete")?,
    })
}

fn decode_integer(row: &TextRow, column: &str) -> DecodeResult<i64> {
    let raw = required(row, column)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidInteger {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn required<'row>(row: &'row TextRow, column: &str) -> DecodeResult<&'row str> {
    match row.cell(column) {
        None => Err(DecodeError::MissingColumn(column.to_string())),
        Some(None) => Err(DecodeError::NullValue(column.to_string())),
        Some(Some(value)) => Ok(value),
    }
}
