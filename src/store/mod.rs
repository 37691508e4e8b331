// ============================================================================
// Store Layer - Collaborator Contracts
// ============================================================================
//
// The repeat handler only talks to these traits:
// - OrderStore  - keyed lookup of placed orders
// - Catalog     - resolves (product, variation) to a sellable product
// - SessionCart - the current session's cart (clear / add)
// - NoticeSink  - flash messages for the current session
//
// In-memory implementations back the binary and the tests.
//
// ============================================================================

mod memory;
mod seed;
mod session;

use async_trait::async_trait;

use crate::domain::cart::{CartError, CartLineKey, CartNotice};
use crate::domain::catalog::Product;
use crate::domain::order::{CustomerId, Order, OrderId, ProductId, VariationId};

pub use memory::{InMemoryCatalog, InMemoryOrderStore};
pub use seed::SeedData;
pub use session::{SessionHandle, SessionId, SessionStore, DEFAULT_IDLE_TTL_SECS};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// `Ok(None)` when no order exists for `id`
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders placed by a customer, newest first
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// `Ok(None)` when the product is gone or not published
    async fn resolve(
        &self,
        product_id: ProductId,
        variation_id: Option<VariationId>,
    ) -> Result<Option<Product>, StoreError>;
}

/// Cart of a single session
#[async_trait]
pub trait SessionCart: Send + Sync {
    async fn empty(&self) -> Result<(), CartError>;

    async fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        variation_id: Option<VariationId>,
    ) -> Result<CartLineKey, CartError>;
}

#[async_trait]
pub trait NoticeSink: Send + Sync {
    async fn push(&self, notice: CartNotice);
}
