//! Ledger engine: base stock, per-project demand, activity journal.
//!
//! This crate contains the business rules only, implemented as deterministic
//! in-memory logic (no IO, no locking, no storage concerns; those live in
//! `cellstock-infra`). One `Ledger` value owns the base-stock table, the
//! demand tables of every project and the append-only journal, and serializes
//! all mutations through `&mut self`.

pub mod demand;
pub mod journal;
pub mod ledger;
pub mod stock;

pub use demand::DemandLine;
pub use journal::{ActivityLog, LogAction, LogEntry};
pub use ledger::{Ledger, LoadError, ReplenishmentRow};
pub use stock::StockItem;
