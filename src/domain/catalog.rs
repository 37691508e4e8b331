use serde::{Deserialize, Serialize};

use super::order::{ProductId, VariationId};

// ============================================================================
// Catalog Value Objects
// ============================================================================

/// A sellable product (or a specific variation of one) as resolved by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub variation_id: Option<VariationId>,
    pub name: String,
    #[serde(default = "default_purchasable")]
    pub purchasable: bool,
    /// `None` means stock is not managed for this product
    #[serde(default)]
    pub stock: Option<u32>,
}

fn default_purchasable() -> bool {
    true
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            variation_id: None,
            name: name.into(),
            purchasable: true,
            stock: None,
        }
    }

    pub fn with_variation(mut self, variation_id: VariationId) -> Self {
        self.variation_id = Some(variation_id);
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn unpurchasable(mut self) -> Self {
        self.purchasable = false;
        self
    }
}
