//! Todo types
//!
//! `Todo` is the stored record. `NewTodo` and `TodoPatch` are the shapes
//! accepted by create and update; both deserialize straight from request
//! bodies.

use serde::{Deserialize, Deserializer, Serialize};

/// Status given to a todo created without one.
pub const DEFAULT_STATUS: &str = "pending";

/// A stored todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned, never reused
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

impl Todo {
    /// Build a todo from a row carrying the four `todos` columns.
    ///
    /// Columns are read by name. A `NULL` status (only possible in images
    /// written by other tools) reads back as the default status.
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let status: Option<String> = row.get("status")?;
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

/// Input for creating a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Partial update for a todo.
///
/// Each field is tri-state: `None` when the key was absent from the request,
/// `Some(None)` for an explicit `null`, `Some(Some(v))` for a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
}

impl TodoPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = Some(description.map(str::to_string));
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(Some(status.into()));
        self
    }

    /// Apply the patch on top of `current`.
    ///
    /// `title` and `status` are non-null columns, so an explicit null keeps
    /// the stored value. An explicit null description clears it.
    pub fn apply(self, current: Todo) -> Todo {
        Todo {
            id: current.id,
            title: self.title.flatten().unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            status: self.status.flatten().unwrap_or(current.status),
        }
    }
}

// Only called when the key is present, so absence stays `None` via `default`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
