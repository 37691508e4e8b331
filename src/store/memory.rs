use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::catalog::Product;
use crate::domain::order::{CustomerId, Order, OrderId, ProductId, VariationId};
use super::{Catalog, OrderStore, StoreError};

// ============================================================================
// In-Memory Order Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders.into_iter().map(|o| (o.id, o)).collect();
        Self { orders: RwLock::new(orders) }
    }

    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(orders)
    }
}

// ============================================================================
// In-Memory Catalog
// ============================================================================
//
// Products are keyed by (product, variation). A line that names a variation
// only resolves if that exact variation is listed.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<(ProductId, Option<VariationId>), Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|p| ((p.id, p.variation_id), p))
            .collect();
        Self { products: RwLock::new(products) }
    }

    pub async fn insert(&self, product: Product) {
        self.products
            .write()
            .await
            .insert((product.id, product.variation_id), product);
    }

    /// Unpublish a product; later lookups resolve to nothing
    pub async fn remove(&self, product_id: ProductId, variation_id: Option<VariationId>) {
        self.products.write().await.remove(&(product_id, variation_id));
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn resolve(
        &self,
        product_id: ProductId,
        variation_id: Option<VariationId>,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&(product_id, variation_id)).cloned())
    }
}
