//! Domain error model.

use thiserror::Error;

use crate::id::{ProductCode, ProjectId};

/// Result type used across the domain layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Deterministic rejection of a ledger operation.
///
/// These are values, not exceptions: a rejected operation leaves the ledger
/// untouched and the caller decides how to present the failure. Variants carry
/// the quantities involved so presentation layers never have to re-read state
/// to build a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The input quantity was zero or negative.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i64),

    /// The product code does not exist in base stock.
    #[error("product {0} not found in base stock")]
    UnknownProduct(ProductCode),

    /// No demand line exists for the (project, product) pair.
    #[error("project {project} has no demand line for product {product}")]
    UnknownDemand {
        project: ProjectId,
        product: ProductCode,
    },

    /// The operation would drive available stock below zero.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },

    /// The issue would exceed the project's remaining requirement.
    #[error("issue of {requested} exceeds remaining requirement of {required}")]
    ExceedsDemand { requested: u64, required: u64 },
}
