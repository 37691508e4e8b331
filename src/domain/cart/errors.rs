use crate::domain::order::ProductId;

// ============================================================================
// Cart Insertion Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Quantity must be positive")]
    ZeroQuantity,

    #[error("Product {0} cannot be purchased")]
    NotPurchasable(ProductId),

    #[error("Not enough stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Cart backend failure: {0}")]
    Backend(String),
}
