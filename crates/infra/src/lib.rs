//! Infrastructure layer: session state, storage boundary, config, telemetry.
//!
//! The engine in `cellstock-ledger` is pure and single-owner; this crate
//! hosts it for a real session. `SharedLedger` provides the serialization
//! discipline for concurrent callers (one writer at a time, consistent read
//! snapshots) and the load-once / mutate-in-memory / flush-on-commit
//! lifecycle against a `LedgerStore`.

pub mod config;
pub mod shared;
pub mod store;
pub mod telemetry;

pub use config::StoreConfig;
pub use shared::{CommitError, OpenError, SharedLedger};
pub use store::{
    InMemoryLedgerStore, JsonFileStore, LedgerSnapshot, LedgerStore, RawDemandRow, RawStockRow,
    SnapshotError, StoreError,
};

#[cfg(test)]
mod integration_tests;
