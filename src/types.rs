//! Core types for the Tasks API.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A task record as persisted in the snapshot file.
///
/// `created_at` is kept as the raw ISO-8601 string so that records
/// round-trip byte-for-byte and the `createdAt` sort stays a plain
/// lexicographic comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub done: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Task {
    /// Create a new task with the given id and title, not done,
    /// stamped with the current time.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            created_at: now_iso(),
        }
    }
}

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// e.g. `2026-08-06T08:01:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Next id for a new task: highest existing id plus one.
/// Ids are never reused after deletion.
pub fn next_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
}
