//! Session state: one ledger behind a single-writer lock.
//!
//! A session loads once, every mutating operation runs its whole
//! read-check-write-journal sequence under the write lock, and the committed
//! state is flushed through the store before the lock is released. Readers
//! share a read lock and always observe a committed snapshot. Reloading per
//! request instead would reopen the check-then-act race between concurrent
//! sessions.

use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, info};

use cellstock_core::{Actor, LedgerError, ProductCode, ProjectId};
use cellstock_ledger::{DemandLine, Ledger, LogEntry, ReplenishmentRow, StockItem};

use crate::store::{LedgerSnapshot, LedgerStore, SnapshotError, StoreError};

/// Failure to open a session.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Outcome of a mutating call that did not fully succeed.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The engine rejected the operation. Nothing changed, in memory or on
    /// disk.
    #[error(transparent)]
    Rejected(#[from] LedgerError),

    /// The engine committed but the flush failed. The in-memory ledger and
    /// journal carry the mutation; the caller decides whether to retry the
    /// flush or surface the storage problem.
    #[error("commit applied in memory, but persisting it failed")]
    Flush(#[source] StoreError),

    #[error("ledger lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct State {
    ledger: Ledger,
    /// Increments once per committed mutation; readers use it to detect
    /// staleness across snapshots.
    version: u64,
}

/// A ledger shared between concurrent callers.
#[derive(Debug)]
pub struct SharedLedger<S> {
    state: RwLock<State>,
    store: S,
}

impl<S: LedgerStore> SharedLedger<S> {
    /// Load the record set once and hold it for the session.
    pub fn open(store: S) -> Result<Self, OpenError> {
        let ledger = store.load()?.into_ledger()?;
        info!(
            products = ledger.stock().len(),
            demand_lines = ledger.demand().len(),
            journal = ledger.journal().len(),
            "ledger session opened"
        );
        Ok(Self {
            state: RwLock::new(State { ledger, version: 0 }),
            store,
        })
    }

    /// Add to or remove from base stock. See `Ledger::adjust_stock`.
    pub fn adjust_stock(
        &self,
        product_code: &ProductCode,
        delta: i64,
        performed_by: &Actor,
    ) -> Result<LogEntry, CommitError> {
        self.commit(|ledger| ledger.adjust_stock(product_code, delta, performed_by))
    }

    /// Issue stock to a project. See `Ledger::issue_to_project`.
    pub fn issue_to_project(
        &self,
        project: &ProjectId,
        product_code: &ProductCode,
        quantity: i64,
        performed_by: &Actor,
    ) -> Result<LogEntry, CommitError> {
        self.commit(|ledger| ledger.issue_to_project(project, product_code, quantity, performed_by))
    }

    fn commit(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<LogEntry, LedgerError>,
    ) -> Result<LogEntry, CommitError> {
        let mut state = self.state.write().map_err(|_| CommitError::Poisoned)?;

        let entry = match op(&mut state.ledger) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "ledger rejected operation");
                return Err(CommitError::Rejected(err));
            }
        };

        state.version += 1;
        info!(
            action = ?entry.action,
            product = %entry.product_code,
            quantity = entry.quantity,
            performed_by = %entry.performed_by,
            version = state.version,
            "ledger commit"
        );

        // Flush while still holding the write lock, so the store sees
        // commits in order and never a half-applied one.
        let snapshot = LedgerSnapshot::from_ledger(&state.ledger);
        self.store.persist(&snapshot).map_err(CommitError::Flush)?;

        Ok(entry)
    }

    /// Run a closure against a consistent snapshot of the ledger.
    ///
    /// Readers tolerate lock poisoning: engine operations check every
    /// precondition before their first write, so the state a reader can
    /// observe is always a committed prefix.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state.ledger)
    }

    /// Number of mutations committed in this session.
    pub fn version(&self) -> u64 {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.version
    }

    pub fn stock(&self) -> Vec<StockItem> {
        self.read(|ledger| ledger.stock().to_vec())
    }

    pub fn projects(&self) -> Vec<ProjectId> {
        self.read(|ledger| ledger.projects())
    }

    pub fn pending_demand(&self, project: &ProjectId) -> Vec<DemandLine> {
        self.read(|ledger| {
            ledger
                .pending_demand(project)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn max_issuable(&self, project: &ProjectId, product_code: &ProductCode) -> Option<u64> {
        self.read(|ledger| ledger.max_issuable(project, product_code))
    }

    pub fn replenishment(&self) -> Vec<ReplenishmentRow> {
        self.read(|ledger| ledger.replenishment())
    }

    pub fn journal_entries(&self) -> Vec<LogEntry> {
        self.read(|ledger| ledger.journal().entries().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::store::{InMemoryLedgerStore, RawDemandRow, RawStockRow};

    fn actor() -> Actor {
        Actor::new("ops.user").unwrap()
    }

    fn code(s: &str) -> ProductCode {
        ProductCode::new(s).unwrap()
    }

    fn project(s: &str) -> ProjectId {
        ProjectId::new(s).unwrap()
    }

    fn seeded_store() -> Arc<InMemoryLedgerStore> {
        let mut demand = BTreeMap::new();
        demand.insert(
            "LFP EV".to_string(),
            vec![RawDemandRow {
                product_code: "A".to_string(),
                required_quantity: Some(7.0),
            }],
        );
        Arc::new(InMemoryLedgerStore::seeded(LedgerSnapshot {
            stock: vec![RawStockRow {
                product_code: "A".to_string(),
                product_name: "A cell".to_string(),
                supplier: None,
                quantity_available: Some(10.0),
            }],
            demand,
            log: Vec::new(),
        }))
    }

    #[test]
    fn commits_bump_the_version_and_flush_to_the_store() {
        let store = seeded_store();
        let shared = SharedLedger::open(store.clone()).unwrap();
        assert_eq!(shared.version(), 0);

        shared
            .issue_to_project(&project("LFP EV"), &code("A"), 5, &actor())
            .unwrap();

        assert_eq!(shared.version(), 1);
        assert_eq!(
            shared.read(|l| l.stock_item(&code("A")).unwrap().quantity_available),
            5
        );

        // The store holds the committed state, journal included.
        let persisted = store.load().unwrap();
        assert_eq!(persisted.stock[0].quantity_available, Some(5.0));
        assert_eq!(persisted.demand["LFP EV"][0].required_quantity, Some(2.0));
        assert_eq!(persisted.log.len(), 1);
    }

    #[test]
    fn rejections_do_not_bump_the_version_or_touch_the_store() {
        let store = seeded_store();
        let shared = SharedLedger::open(store.clone()).unwrap();

        let err = shared
            .issue_to_project(&project("LFP EV"), &code("A"), 8, &actor())
            .unwrap_err();

        assert!(matches!(
            err,
            CommitError::Rejected(LedgerError::ExceedsDemand { .. })
        ));
        assert_eq!(shared.version(), 0);
        assert!(store.load().unwrap().log.is_empty());
    }
}
