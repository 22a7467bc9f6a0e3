//! Todo list record.

use serde::{Deserialize, Serialize};

/// Storage-assigned list identifier.
pub type ListId = i64;

/// A todo list together with counts derived from its todos.
///
/// The counts are computed by the store on every read; the list does not
/// carry its todos in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    /// Number of todos under this list.
    pub todos_count: i64,
    /// Number of todos not yet complete.
    pub todos_remaining: i64,
}

impl List {
    /// A list counts as done once it has todos and none remain open.
    pub fn is_complete(&self) -> bool {
        self.todos_count > 0 && self.todos_remaining == 0
    }
}
