use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::Product;
use crate::domain::order::{ProductId, VariationId};
use super::errors::CartError;

// ============================================================================
// Cart Value Objects
// ============================================================================

/// Key of a cart line, derived from the (product, variation) identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineKey(String);

impl CartLineKey {
    pub fn for_item(product_id: ProductId, variation_id: Option<VariationId>) -> Self {
        match variation_id {
            Some(variation) => Self(format!("{}-{}", product_id, variation)),
            None => Self(format!("{}", product_id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartLineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: CartLineKey,
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    pub name: String,
}

/// Session-scoped shopping cart. Lines keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn line(&self, key: &CartLineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key == key)
    }

    /// Add `quantity` of a resolved product. Adding an identity that is
    /// already in the cart merges into the existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<CartLineKey, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if !product.purchasable {
            return Err(CartError::NotPurchasable(product.id));
        }

        let key = CartLineKey::for_item(product.id, product.variation_id);
        let already_in_cart = self.line(&key).map(|l| l.quantity).unwrap_or(0);
        let requested = already_in_cart.saturating_add(quantity);

        if let Some(available) = product.stock {
            if requested > available {
                return Err(CartError::InsufficientStock {
                    product_id: product.id,
                    requested,
                    available,
                });
            }
        }

        match self.lines.iter_mut().find(|l| l.key == key) {
            Some(line) => line.quantity = requested,
            None => self.lines.push(CartLine {
                key: key.clone(),
                product_id: product.id,
                variation_id: product.variation_id,
                quantity,
                name: product.name.clone(),
            }),
        }

        Ok(key)
    }
}

/// "Added to cart" confirmation shown once on the next page render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartNotice {
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl CartNotice {
    pub fn added(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
