//! Record store: snapshot persistence for the task collection.
//!
//! The whole collection is read and rewritten on every access. There is no
//! partial update format; the snapshot file is the sole source of truth
//! between requests.

use crate::types::Task;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Storage abstraction over the task collection.
///
/// `load` fails soft: an absent or malformed snapshot is an empty
/// collection, never an error. `save` overwrites the full snapshot and
/// propagates I/O failures to the caller.
pub trait TaskStore: Send + Sync {
    /// Read the persisted collection.
    fn load(&self) -> Vec<Task>;

    /// Overwrite the persisted collection.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// File-backed store holding the collection as a pretty-printed JSON array.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Vec<Task> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            // Missing file is the empty collection (first run).
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Snapshot file is malformed; treating as empty collection"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write snapshot {}", self.path.display()))
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the collection, replacing current contents.
    pub fn seed(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap() = tasks;
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        *self.tasks.lock().unwrap() = tasks.to_vec();
        Ok(())
    }
}
