use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use cellstock_core::{Actor, LedgerError, LedgerResult, ProductCode, ProjectId};

use crate::demand::DemandLine;
use crate::journal::{ActivityLog, LogAction, LogEntry};
use crate::stock::StockItem;

/// Duplicate keys discovered while building the ledger indices.
///
/// Uniqueness of `product_code` (and of `(project, product_code)` pairs) is
/// enforced once, at construction; afterwards the keyed indices are
/// authoritative.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("duplicate product code in base stock: {0}")]
    DuplicateProduct(ProductCode),

    #[error("duplicate demand line for project {project}, product {product}")]
    DuplicateDemand {
        project: ProjectId,
        product: ProductCode,
    },
}

/// One row of the restock report: a product whose available quantity is below
/// the total outstanding requirement across all projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplenishmentRow {
    pub product_code: ProductCode,
    pub product_name: String,
    pub supplier: Option<String>,
    pub quantity_available: u64,
    pub total_required: u64,
}

/// The ledger engine.
///
/// Owns the base-stock table, the demand tables of every project and the
/// activity journal. Tables keep their load order (reports are rendered in
/// table order); keyed indices give O(1) lookup. All mutating operations are
/// all-or-nothing: every precondition is checked before the first write, so a
/// rejected call leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    stock: Vec<StockItem>,
    stock_index: HashMap<ProductCode, usize>,
    demand: Vec<DemandLine>,
    demand_index: HashMap<(ProjectId, ProductCode), usize>,
    journal: ActivityLog,
}

impl Ledger {
    /// Build a ledger with a fresh journal.
    pub fn new(stock: Vec<StockItem>, demand: Vec<DemandLine>) -> Result<Self, LoadError> {
        Self::restore(stock, demand, ActivityLog::new())
    }

    /// Rebuild a ledger from a previous session's tables and journal.
    pub fn restore(
        stock: Vec<StockItem>,
        demand: Vec<DemandLine>,
        journal: ActivityLog,
    ) -> Result<Self, LoadError> {
        let mut stock_index = HashMap::with_capacity(stock.len());
        for (idx, item) in stock.iter().enumerate() {
            if stock_index.insert(item.product_code.clone(), idx).is_some() {
                return Err(LoadError::DuplicateProduct(item.product_code.clone()));
            }
        }

        let mut demand_index = HashMap::with_capacity(demand.len());
        for (idx, row) in demand.iter().enumerate() {
            if demand_index.insert(row.key(), idx).is_some() {
                return Err(LoadError::DuplicateDemand {
                    project: row.project.clone(),
                    product: row.product_code.clone(),
                });
            }
        }

        Ok(Self {
            stock,
            stock_index,
            demand,
            demand_index,
            journal,
        })
    }

    /// Add to or remove from base stock.
    ///
    /// `delta > 0` records an `Added` entry, `delta < 0` a `Removed` one;
    /// `delta == 0` is rejected before any lookup (quantity validation
    /// precedes existence checks everywhere in this engine).
    pub fn adjust_stock(
        &mut self,
        product_code: &ProductCode,
        delta: i64,
        performed_by: &Actor,
    ) -> LedgerResult<LogEntry> {
        if delta == 0 {
            return Err(LedgerError::InvalidQuantity(0));
        }

        let idx = self.stock_idx(product_code)?;
        let magnitude = delta.unsigned_abs();
        let available = self.stock[idx].quantity_available;

        let (next, action) = if delta > 0 {
            (available.saturating_add(magnitude), LogAction::Added)
        } else {
            match available.checked_sub(magnitude) {
                Some(next) => (next, LogAction::Removed),
                None => {
                    return Err(LedgerError::InsufficientStock {
                        requested: magnitude,
                        available,
                    });
                }
            }
        };

        // Commit: the quantity write and the journal append happen together.
        self.stock[idx].quantity_available = next;
        let entry = self.record(idx, None, magnitude, action, performed_by);
        Ok(entry)
    }

    /// Receive `quantity` units into base stock.
    ///
    /// The input side of every add/remove form demands a positive quantity;
    /// the signed delta is formed only after that check.
    pub fn add_stock(
        &mut self,
        product_code: &ProductCode,
        quantity: i64,
        performed_by: &Actor,
    ) -> LedgerResult<LogEntry> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        self.adjust_stock(product_code, quantity, performed_by)
    }

    /// Take `quantity` units out of base stock.
    pub fn remove_stock(
        &mut self,
        product_code: &ProductCode,
        quantity: i64,
        performed_by: &Actor,
    ) -> LedgerResult<LogEntry> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        self.adjust_stock(product_code, -quantity, performed_by)
    }

    /// Transfer quantity from base stock to a project's outstanding demand.
    ///
    /// Preconditions are checked in a fixed order and the first failure wins:
    /// positive quantity, product known, demand line known, enough stock,
    /// within the remaining requirement. The two decrements and the journal
    /// append form a single atomic unit.
    pub fn issue_to_project(
        &mut self,
        project: &ProjectId,
        product_code: &ProductCode,
        quantity: i64,
        performed_by: &Actor,
    ) -> LedgerResult<LogEntry> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        let quantity = quantity as u64;

        let stock_idx = self.stock_idx(product_code)?;
        let demand_idx = self
            .demand_index
            .get(&(project.clone(), product_code.clone()))
            .copied()
            .ok_or_else(|| LedgerError::UnknownDemand {
                project: project.clone(),
                product: product_code.clone(),
            })?;

        let available = self.stock[stock_idx].quantity_available;
        if quantity > available {
            return Err(LedgerError::InsufficientStock {
                requested: quantity,
                available,
            });
        }

        let required = self.demand[demand_idx].required_quantity;
        if quantity > required {
            return Err(LedgerError::ExceedsDemand {
                requested: quantity,
                required,
            });
        }

        // Commit: both decrements and the journal append happen together.
        self.stock[stock_idx].quantity_available = available - quantity;
        self.demand[demand_idx].required_quantity = required - quantity;
        let entry = self.record(
            stock_idx,
            Some(project.clone()),
            quantity,
            LogAction::Issued,
            performed_by,
        );
        Ok(entry)
    }

    /// Products whose available quantity is below the total requirement
    /// summed across all projects.
    ///
    /// Left join from the stock table: rows come back in stock-table order,
    /// products with no demand lines count as requiring 0, and codes present
    /// only in demand are excluded (the report is about restocking what the
    /// base-stock table tracks). Recomputed from the live tables on every
    /// call.
    pub fn replenishment(&self) -> Vec<ReplenishmentRow> {
        let mut totals: HashMap<&ProductCode, u64> = HashMap::new();
        for row in &self.demand {
            let total = totals.entry(&row.product_code).or_insert(0);
            *total = total.saturating_add(row.required_quantity);
        }

        self.stock
            .iter()
            .filter_map(|item| {
                let total_required = totals.get(&item.product_code).copied().unwrap_or(0);
                if item.quantity_available < total_required {
                    Some(ReplenishmentRow {
                        product_code: item.product_code.clone(),
                        product_name: item.product_name.clone(),
                        supplier: item.supplier.clone(),
                        quantity_available: item.quantity_available,
                        total_required,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Base-stock rows in table order.
    pub fn stock(&self) -> &[StockItem] {
        &self.stock
    }

    /// Keyed lookup into base stock.
    pub fn stock_item(&self, product_code: &ProductCode) -> Option<&StockItem> {
        self.stock_index
            .get(product_code)
            .map(|&idx| &self.stock[idx])
    }

    /// All demand lines, across projects, in table order.
    pub fn demand(&self) -> &[DemandLine] {
        &self.demand
    }

    /// The distinct projects present in the demand tables, in first-seen order.
    pub fn projects(&self) -> Vec<ProjectId> {
        let mut seen = Vec::new();
        for row in &self.demand {
            if !seen.contains(&row.project) {
                seen.push(row.project.clone());
            }
        }
        seen
    }

    /// A project's BOM lines in table order.
    pub fn demand_for(&self, project: &ProjectId) -> Vec<&DemandLine> {
        self.demand
            .iter()
            .filter(|row| &row.project == project)
            .collect()
    }

    /// A project's BOM lines that still have an outstanding requirement.
    pub fn pending_demand(&self, project: &ProjectId) -> Vec<&DemandLine> {
        self.demand
            .iter()
            .filter(|row| &row.project == project && row.is_pending())
            .collect()
    }

    /// Upper bound for an issue of `product_code` to `project`:
    /// `min(quantity_available, required_quantity)`. `None` when either the
    /// stock row or the demand line is missing.
    pub fn max_issuable(&self, project: &ProjectId, product_code: &ProductCode) -> Option<u64> {
        let item = self.stock_item(product_code)?;
        let demand_idx = self
            .demand_index
            .get(&(project.clone(), product_code.clone()))
            .copied()?;
        Some(
            item.quantity_available
                .min(self.demand[demand_idx].required_quantity),
        )
    }

    /// The activity journal.
    pub fn journal(&self) -> &ActivityLog {
        &self.journal
    }

    fn stock_idx(&self, product_code: &ProductCode) -> LedgerResult<usize> {
        self.stock_index
            .get(product_code)
            .copied()
            .ok_or_else(|| LedgerError::UnknownProduct(product_code.clone()))
    }

    fn record(
        &mut self,
        stock_idx: usize,
        project: Option<ProjectId>,
        quantity: u64,
        action: LogAction,
        performed_by: &Actor,
    ) -> LogEntry {
        let item = &self.stock[stock_idx];
        let entry = LogEntry {
            entry_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            project,
            product_code: item.product_code.clone(),
            product_name: item.product_name.clone(),
            quantity,
            action,
            performed_by: performed_by.clone(),
        };
        self.journal.append(entry.clone());
        entry
    }
}
