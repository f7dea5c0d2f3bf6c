//! SQLite storage implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};

use super::schema;
use crate::{Error, Result};

/// SQLite-backed storage for todos.
///
/// The connection is opened lazily on first use: the durable image at `path`
/// is restored into an in-memory database, or an empty one is created when no
/// image exists yet. Every [`SqliteStore::write`] copies the whole image back
/// to disk before returning.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Bind a store to a database file. Nothing is read until first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            conn: Mutex::new(None),
        }
    }

    /// A store with no durable image (for testing)
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            conn: Mutex::new(None),
        }
    }

    /// Whether the connection has been initialized
    pub fn is_open(&self) -> bool {
        self.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Initialize the connection if it is not open yet.
    pub fn acquire(&self) -> Result<()> {
        let mut slot = self.lock()?;
        self.ensure_open(&mut slot)?;
        Ok(())
    }

    /// Run a read-only unit of work.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut slot = self.lock()?;
        let conn = self.ensure_open(&mut slot)?;
        f(conn)
    }

    /// Run a mutating unit of work and persist the result.
    ///
    /// The lock is held from the first statement until the image is on disk,
    /// so check-then-write sequences inside `f` cannot interleave with other
    /// mutations.
    ///
    /// If the image cannot be written, the connection is dropped so the next
    /// call reloads the last saved image and the failed mutation never shows.
    pub fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut slot = self.lock()?;
        let conn = self.ensure_open(&mut slot)?;
        let value = f(conn)?;
        if let Err(e) = self.flush(conn) {
            tracing::error!("Failed to save database, discarding unsaved changes: {}", e);
            *slot = None;
            return Err(e);
        }
        Ok(value)
    }

    /// Write the current image to disk, overwriting the previous one.
    pub fn persist(&self) -> Result<()> {
        let slot = self.lock()?;
        match slot.as_ref() {
            Some(conn) => self.flush(conn),
            None => Ok(()),
        }
    }

    /// Persist and release the connection. A later call reopens it lazily.
    pub fn close(&self) -> Result<()> {
        let mut slot = self.lock()?;
        if let Some(conn) = slot.take() {
            if let Err(e) = self.flush(&conn) {
                *slot = Some(conn);
                return Err(e);
            }
            tracing::info!("Closed database");
        }
        Ok(())
    }

    /// Count all todos
    pub fn count(&self) -> Result<usize> {
        self.read(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    fn ensure_open<'a>(&self, slot: &'a mut Option<Connection>) -> Result<&'a Connection> {
        let conn = match slot.take() {
            Some(conn) => conn,
            None => self.load()?,
        };
        let conn: &Connection = slot.insert(conn);
        Ok(conn)
    }

    fn load(&self) -> Result<Connection> {
        let mut conn = Connection::open_in_memory()?;

        match &self.path {
            Some(path) if path.exists() => {
                tracing::info!("Loading database from {}", path.display());
                conn.restore(DatabaseName::Main, path, None::<fn(Progress)>)?;
            }
            Some(path) => {
                tracing::info!("No database at {}, starting empty", path.display());
            }
            None => tracing::debug!("Opening in-memory database"),
        }

        initialize_schema(&conn)?;
        Ok(conn)
    }

    /// Copy the image to a staging file, then rename it over the target.
    fn flush(&self, conn: &Connection) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = staging_path(path);
        if staging.exists() {
            fs::remove_file(&staging)?;
        }
        conn.backup(DatabaseName::Main, &staging, None)?;
        fs::rename(&staging, path)?;

        tracing::debug!("Saved database to {}", path.display());
        Ok(())
    }
}

/// Initialize the database schema
fn initialize_schema(conn: &Connection) -> Result<()> {
    for stmt in schema::all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
