use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::catalog::Product;
use crate::domain::order::Order;
use super::{InMemoryCatalog, InMemoryOrderStore, StoreError};

// ============================================================================
// Seed Data - JSON fixture for the in-memory stores
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn into_stores(self) -> (InMemoryOrderStore, InMemoryCatalog) {
        (
            InMemoryOrderStore::with_orders(self.orders),
            InMemoryCatalog::with_products(self.products),
        )
    }
}
