use serde::{Deserialize, Serialize};

use cellstock_core::{Entity, ProductCode};

/// One row of the base-stock table.
///
/// `quantity_available` is unsigned: "never negative" is structural, and the
/// arithmetic in the engine still guards every subtraction so a rejected
/// operation cannot wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub product_code: ProductCode,
    pub product_name: String,
    pub supplier: Option<String>,
    pub quantity_available: u64,
}

impl Entity for StockItem {
    type Id = ProductCode;

    fn id(&self) -> &ProductCode {
        &self.product_code
    }
}
