//! Storage Layer - SQLite-backed persistence
//!
//! The live database is an in-memory SQLite connection. It is restored from
//! the durable image on first use and written back in full after every
//! mutation. Tables:
//! - todos(id, title, description, status)

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;
