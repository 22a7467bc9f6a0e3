//! Plain records handed to the web front end.
//!
//! # Invariants
//! - Records are snapshots of stored state; nothing here is cached or
//!   written back implicitly.
//! - Identifiers are assigned by storage, never by callers.

pub mod list;
pub mod todo;
