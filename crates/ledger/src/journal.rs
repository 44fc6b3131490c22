use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cellstock_core::{Actor, ProductCode, ProjectId};

/// What a committed mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Added,
    Removed,
    Issued,
}

/// Immutable audit record appended on every committed mutation.
///
/// Entries are created only by the engine; the hosting layer persists them
/// but never edits them. `entry_id` is UUIDv7 so stored entries sort by
/// creation time without relying on the timestamp column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// `None` for pure stock adds/removals; the receiving project for issues.
    pub project: Option<ProjectId>,
    pub product_code: ProductCode,
    pub product_name: String,
    /// Magnitude of the mutation, always positive.
    pub quantity: u64,
    pub action: LogAction,
    pub performed_by: Actor,
}

/// Append-only journal of committed mutations.
///
/// Supports appends and reads, nothing else: there is deliberately no way to
/// edit or truncate recorded history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a journal from previously persisted entries.
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}
