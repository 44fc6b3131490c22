//! Storage collaborator boundary.
//!
//! The ledger engine never performs IO; a `LedgerStore` supplies the initial
//! tables once per session and persists the mutated state after each
//! committed operation. The store decides format and file layout; the
//! engine only sees well-formed rows.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod json;
pub mod memory;
pub mod snapshot;

pub use json::JsonFileStore;
pub use memory::InMemoryLedgerStore;
pub use snapshot::{LedgerSnapshot, RawDemandRow, RawStockRow, SnapshotError};

/// Failure at the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot names a project the store has no file mapping for.
    #[error("no data file configured for project {0:?}")]
    UnmappedProject(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Load-once / persist-per-commit storage contract.
pub trait LedgerStore: Send + Sync {
    /// Supply the full record set at session start.
    fn load(&self) -> Result<LedgerSnapshot, StoreError>;

    /// Persist the full record set after a committed mutation.
    fn persist(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn load(&self) -> Result<LedgerSnapshot, StoreError> {
        (**self).load()
    }

    fn persist(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        (**self).persist(snapshot)
    }
}
