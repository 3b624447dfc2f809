//! Document storage for Rollcall
//!
//! This crate provides a small document-store abstraction: named collections
//! of JSON documents addressed by ID, equality/range filters, conditional
//! inserts, non-atomic batch writes and a change feed. It ships an in-memory
//! implementation and a SQLite implementation.

mod changes;
mod document;
mod error;
mod memory;
mod sqlite;
mod store;

pub use changes::*;
pub use document::*;
pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use store::*;
