//! Offline mirror of the last known task list.
//!
//! A single key in a SQLite key-value table holds the JSON-encoded list.
//! Every write replaces the whole value. The mirror is a cache: `TaskMirror`
//! swallows and logs every failure so callers never have to handle them.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::MirrorError;
use crate::types::Task;

/// Key under which the task list is stored.
pub const TASKS_KEY: &str = "tasks";

type Result<T> = std::result::Result<T, MirrorError>;

/// SQLite key-value storage for the task list.
pub struct MirrorStore {
    conn: Connection,
}

impl MirrorStore {
    /// Open (or create) the mirror database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory mirror.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read the stored task list. `Ok(empty)` when nothing was saved yet.
    pub fn try_load(&self) -> Result<Vec<Task>> {
        match self.get_raw(TASKS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored task list.
    pub fn try_save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.put_raw(TASKS_KEY, &json)
    }

    /// Remove the stored task list.
    pub fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![TASKS_KEY])?;
        Ok(())
    }

    /// Stored list, or empty on any failure.
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!("Ignoring unreadable task mirror: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the stored list, logging any failure.
    pub fn save(&self, tasks: &[Task]) {
        if let Err(e) = self.try_save(tasks) {
            tracing::warn!("Failed to persist task mirror: {}", e);
        }
    }
}

/// Async, cloneable handle to a [`MirrorStore`].
///
/// SQLite work runs on the blocking pool.
#[derive(Clone)]
pub struct TaskMirror {
    store: Arc<Mutex<MirrorStore>>,
}

impl TaskMirror {
    pub fn new(store: MirrorStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Open the mirror at `path`, falling back to an in-memory mirror when the
    /// file cannot be opened. The session keeps working either way.
    pub fn open_or_memory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create mirror directory {}: {}", parent.display(), e);
            }
        }

        match MirrorStore::open(path) {
            Ok(store) => Ok(Self::new(store)),
            Err(e) => {
                tracing::warn!(
                    "Task mirror at {} unavailable ({}), using memory only",
                    path.display(),
                    e
                );
                Ok(Self::new(MirrorStore::in_memory()?))
            }
        }
    }

    /// Persisted task list, or empty if none exists or it cannot be read.
    pub async fn load(&self) -> Vec<Task> {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.lock().load()).await {
            Ok(tasks) => {
                tracing::debug!("Loaded {} tasks from mirror", tasks.len());
                tasks
            }
            Err(e) => {
                tracing::warn!("Task mirror load did not complete: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the persisted task list. Failures are logged only.
    pub async fn save(&self, tasks: Vec<Task>) {
        let store = self.store.clone();
        let count = tasks.len();
        match tokio::task::spawn_blocking(move || store.lock().save(&tasks)).await {
            Ok(()) => tracing::debug!("Saved {} tasks to mirror", count),
            Err(e) => tracing::warn!("Task mirror save did not complete: {}", e),
        }
    }

    /// Drop the persisted task list.
    pub async fn clear(&self) -> Result<()> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.lock().clear())
            .await
            .map_err(|e| MirrorError::Worker(e.to_string()))?
    }
}

impl std::fmt::Debug for TaskMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskMirror").finish_non_exhaustive()
    }
}
