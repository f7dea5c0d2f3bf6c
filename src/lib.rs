//! # todo-api - Todo records over a single-file SQLite store
//!
//! todo-api provides:
//! - A typed `Todo` model with request-side `NewTodo` / `TodoPatch` shapes
//! - `SqliteStore`: a lazily opened in-memory database that is loaded from and
//!   written back to one file after every mutation
//! - `TodoService`: create, list, get, update, delete and title search
//! - An axum HTTP surface mapping `/todos` routes onto the service

pub mod todo;
pub mod storage;
pub mod service;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use todo::{NewTodo, Todo, TodoPatch};
pub use storage::SqliteStore;
pub use service::{Page, TodoService};

/// Result type alias for todo-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for todo-api operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Todo {0} not found")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}
