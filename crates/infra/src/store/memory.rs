//! In-memory store for tests/dev.

use std::sync::Mutex;

use super::{LedgerSnapshot, LedgerStore, StoreError};

/// Holds the latest persisted snapshot in memory.
///
/// Useful in tests to observe exactly what a session flushed, and as a dev
/// backend when no data files are wired up yet.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    inner: Mutex<LedgerSnapshot>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::seeded(LedgerSnapshot::empty())
    }

    /// Start from a known record set.
    pub fn seeded(snapshot: LedgerSnapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<LedgerSnapshot, StoreError> {
        let guard = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn persist(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = snapshot.clone();
        Ok(())
    }
}
