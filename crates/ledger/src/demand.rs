use serde::{Deserialize, Serialize};

use cellstock_core::{ProductCode, ProjectId};

/// One row of a project's bill of materials.
///
/// A demand line may reference a product code absent from base stock;
/// referential integrity is deliberately not enforced here. Issuing against
/// such a line fails on the stock lookup, never on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandLine {
    pub project: ProjectId,
    pub product_code: ProductCode,
    /// Remaining requirement. Monotonically non-increasing except for
    /// external BOM reloads; decremented only by successful issues.
    pub required_quantity: u64,
}

impl DemandLine {
    /// The composite key a demand line is addressed by.
    pub fn key(&self) -> (ProjectId, ProductCode) {
        (self.project.clone(), self.product_code.clone())
    }

    /// True while this line still has an outstanding requirement.
    pub fn is_pending(&self) -> bool {
        self.required_quantity > 0
    }
}
