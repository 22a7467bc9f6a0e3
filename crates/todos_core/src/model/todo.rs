//! Todo item record.

use crate::model::list::ListId;
use serde::{Deserialize, Serialize};

/// Storage-assigned todo identifier.
pub type TodoId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    /// Owning list; storage rejects ids that do not reference a list.
    pub list_id: ListId,
    pub name: String,
    pub complete: bool,
}
