//! Todo operations over a [`SqliteStore`].
//!
//! Every call goes through the store; nothing is cached here. Mutations use
//! [`SqliteStore::write`], so the existence check, the statement and the
//! persist run as one locked unit.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::SqliteStore;
use crate::todo::{NewTodo, Todo, TodoPatch, DEFAULT_STATUS};
use crate::{Error, Result};

const SELECT_BY_ID: &str = "SELECT id, title, description, status FROM todos WHERE id = ?1";

const SELECT_PAGE: &str =
    "SELECT id, title, description, status FROM todos ORDER BY id LIMIT ?1 OFFSET ?2";

// instr() is a literal, case-sensitive match; LIKE would treat % and _ as
// wildcards and fold ASCII case.
const SELECT_BY_TITLE: &str = r#"
SELECT id, title, description, status
FROM todos
WHERE ?1 = '' OR instr(title, ?1) > 0
ORDER BY id
"#;

/// Window over the id-ordered todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_SKIP: u32 = 0;
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// Build a page from raw query values.
    ///
    /// Missing, non-numeric, negative or zero values fall back to the
    /// defaults; malformed pagination is never an error.
    pub fn from_query(skip: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            skip: parse_count(skip).unwrap_or(Self::DEFAULT_SKIP),
            limit: parse_count(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SKIP, Self::DEFAULT_LIMIT)
    }
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Create, read, update, delete and search todos.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<SqliteStore>,
}

impl TodoService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Insert a todo and return the stored row.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when the title is missing or empty; nothing is
    /// inserted in that case.
    pub fn create(&self, input: NewTodo) -> Result<Todo> {
        let title = match input.title {
            Some(title) if !title.is_empty() => title,
            _ => return Err(Error::Validation("title is required".to_string())),
        };
        let description = input.description;
        let status = input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string());

        tracing::info!(title = %title, "Creating todo");
        self.store.write(|conn| {
            conn.execute(
                "INSERT INTO todos (title, description, status) VALUES (?1, ?2, ?3)",
                params![title, description, status],
            )?;
            let id = conn.last_insert_rowid();
            find(conn, id)?.ok_or(Error::NotFound(id))
        })
    }

    /// List todos in id order, skipping `page.skip` and returning at most
    /// `page.limit`.
    pub fn list(&self, page: Page) -> Result<Vec<Todo>> {
        let todos = self.store.read(|conn| {
            let mut stmt = conn.prepare(SELECT_PAGE)?;
            let todos = stmt
                .query_map(params![page.limit, page.skip], Todo::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(todos)
        })?;

        tracing::debug!(skip = page.skip, limit = page.limit, "Found {} todos", todos.len());
        Ok(todos)
    }

    /// Get a todo by id
    pub fn get(&self, id: i64) -> Result<Todo> {
        self.store
            .read(|conn| find(conn, id))?
            .ok_or(Error::NotFound(id))
    }

    /// Apply a partial update and return the stored row.
    ///
    /// Omitted fields keep their stored value. All three mutable columns are
    /// written in one statement.
    pub fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo> {
        if matches!(&patch.title, Some(Some(title)) if title.is_empty()) {
            return Err(Error::Validation("title must not be empty".to_string()));
        }

        self.store.write(|conn| {
            let current = find(conn, id)?.ok_or(Error::NotFound(id))?;
            let next = patch.apply(current);

            conn.execute(
                "UPDATE todos SET title = ?1, description = ?2, status = ?3 WHERE id = ?4",
                params![next.title, next.description, next.status, id],
            )?;
            tracing::info!(id, "Updated todo");

            find(conn, id)?.ok_or(Error::NotFound(id))
        })
    }

    /// Hard-delete a todo
    pub fn delete(&self, id: i64) -> Result<()> {
        self.store.write(|conn| {
            if find(conn, id)?.is_none() {
                return Err(Error::NotFound(id));
            }
            conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            tracing::info!(id, "Deleted todo");
            Ok(())
        })
    }

    /// Todos whose title contains `query`, in id order.
    ///
    /// Matching is literal and case-sensitive. An empty query matches every
    /// todo.
    pub fn search(&self, query: &str) -> Result<Vec<Todo>> {
        let todos = self.store.read(|conn| {
            let mut stmt = conn.prepare(SELECT_BY_TITLE)?;
            let todos = stmt
                .query_map(params![query], Todo::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(todos)
        })?;

        tracing::debug!(query, "Search matched {} todos", todos.len());
        Ok(todos)
    }

    /// Count all todos
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }
}

fn find(conn: &Connection, id: i64) -> Result<Option<Todo>> {
    conn.query_row(SELECT_BY_ID, params![id], Todo::from_row)
        .optional()
        .map_err(Into::into)
}
