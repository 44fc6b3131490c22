//! Serde record set exchanged with a `LedgerStore`.
//!
//! Raw rows mirror the spreadsheet columns of the source data files
//! (PascalCase headers) and keep their numeric cells lenient: quantities
//! arrive as optional floats and are coerced to whole non-negative numbers
//! before the engine ever sees them. A missing, non-finite or negative cell
//! counts as 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cellstock_core::{IdError, ProductCode, ProjectId};
use cellstock_ledger::{ActivityLog, DemandLine, Ledger, LoadError, LogEntry, StockItem};

/// One base-stock row as stored in the stock data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStockRow {
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub quantity_available: Option<f64>,
}

/// One BOM row as stored in a project's demand file. The project itself is
/// not a column — each project has its own file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDemandRow {
    pub product_code: String,
    #[serde(default)]
    pub required_quantity: Option<f64>,
}

/// Everything a session loads once and flushes after each commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub stock: Vec<RawStockRow>,
    /// Project name → that project's BOM rows.
    pub demand: BTreeMap<String, Vec<RawDemandRow>>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

/// A snapshot that cannot be turned into a ledger.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid key in {context}")]
    InvalidKey {
        context: String,
        #[source]
        source: IdError,
    },

    #[error(transparent)]
    Duplicate(#[from] LoadError),
}

impl LedgerSnapshot {
    pub fn empty() -> Self {
        Self {
            stock: Vec::new(),
            demand: BTreeMap::new(),
            log: Vec::new(),
        }
    }

    /// Validate keys, coerce quantities and build the engine state.
    pub fn into_ledger(self) -> Result<Ledger, SnapshotError> {
        let mut stock = Vec::with_capacity(self.stock.len());
        for (idx, row) in self.stock.into_iter().enumerate() {
            let product_code =
                ProductCode::new(row.product_code).map_err(|source| SnapshotError::InvalidKey {
                    context: format!("base stock row {idx}"),
                    source,
                })?;
            stock.push(StockItem {
                product_code,
                product_name: row.product_name,
                supplier: row.supplier,
                quantity_available: coerce_quantity(row.quantity_available),
            });
        }

        let mut demand = Vec::new();
        for (name, rows) in self.demand {
            let project = ProjectId::new(name.clone()).map_err(|source| SnapshotError::InvalidKey {
                context: format!("project name {name:?}"),
                source,
            })?;
            for (idx, row) in rows.into_iter().enumerate() {
                let product_code = ProductCode::new(row.product_code).map_err(|source| {
                    SnapshotError::InvalidKey {
                        context: format!("BOM {name:?} row {idx}"),
                        source,
                    }
                })?;
                demand.push(DemandLine {
                    project: project.clone(),
                    product_code,
                    required_quantity: coerce_quantity(row.required_quantity),
                });
            }
        }

        Ok(Ledger::restore(
            stock,
            demand,
            ActivityLog::from_entries(self.log),
        )?)
    }

    /// Render the current engine state back into raw rows for persistence.
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let stock = ledger
            .stock()
            .iter()
            .map(|item| RawStockRow {
                product_code: item.product_code.to_string(),
                product_name: item.product_name.clone(),
                supplier: item.supplier.clone(),
                quantity_available: Some(item.quantity_available as f64),
            })
            .collect();

        let mut demand: BTreeMap<String, Vec<RawDemandRow>> = BTreeMap::new();
        for row in ledger.demand() {
            demand
                .entry(row.project.to_string())
                .or_default()
                .push(RawDemandRow {
                    product_code: row.product_code.to_string(),
                    required_quantity: Some(row.required_quantity as f64),
                });
        }

        Self {
            stock,
            demand,
            log: ledger.journal().entries().to_vec(),
        }
    }
}

// Spreadsheet-grade cells: anything that is not a positive finite number
// counts as zero.
fn coerce_quantity(raw: Option<f64>) -> u64 {
    match raw {
        Some(value) if value.is_finite() && value > 0.0 => value as u64,
        _ => 0,
    }
}
