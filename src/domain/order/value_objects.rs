use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Numeric order identifier as issued by the order store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the textual form carried by the `repeat-order` request parameter.
///
/// Only plain digit strings are accepted: no sign, no whitespace, no
/// fractional or exponent part.
impl FromStr for OrderId {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderError::MalformedId(s.to_string()));
        }

        s.parse::<u64>()
            .map(OrderId)
            .map_err(|_| OrderError::MalformedId(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationId(pub u64);

impl fmt::Display for VariationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    /// Custom per-line data recorded at checkout. Never copied into the cart.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl ProductLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            variation_id: None,
            quantity,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_variation(mut self, variation_id: VariationId) -> Self {
        self.variation_id = Some(variation_id);
        self
    }
}

/// One entry of an order. Only `Product` lines can be repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderLineItem {
    Product(ProductLine),
    Fee { name: String, total_cents: i64 },
    Shipping { method: String, total_cents: i64 },
    Tax { label: String, total_cents: i64 },
    Coupon { code: String, discount_cents: i64 },
}

impl OrderLineItem {
    pub fn kind(&self) -> LineItemKind {
        match self {
            OrderLineItem::Product(_) => LineItemKind::Product,
            OrderLineItem::Fee { .. } => LineItemKind::Fee,
            OrderLineItem::Shipping { .. } => LineItemKind::Shipping,
            OrderLineItem::Tax { .. } => LineItemKind::Tax,
            OrderLineItem::Coupon { .. } => LineItemKind::Coupon,
        }
    }

    pub fn as_product(&self) -> Option<&ProductLine> {
        match self {
            OrderLineItem::Product(line) => Some(line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Product,
    Fee,
    Shipping,
    Tax,
    Coupon,
}

impl LineItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemKind::Product => "product",
            LineItemKind::Fee => "fee",
            LineItemKind::Shipping => "shipping",
            LineItemKind::Tax => "tax",
            LineItemKind::Coupon => "coupon",
        }
    }
}

/// A placed order, read-only from this crate's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Number shown to the customer; falls back to the id when absent
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
}

impl Order {
    pub fn new(id: OrderId, customer_id: CustomerId, items: Vec<OrderLineItem>) -> Self {
        Self {
            id,
            customer_id,
            number: None,
            items,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn display_number(&self) -> String {
        self.number.clone().unwrap_or_else(|| self.id.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn product_lines(&self) -> impl Iterator<Item = &ProductLine> {
        self.items.iter().filter_map(OrderLineItem::as_product)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_parses_plain_digits() {
        assert_eq!("42".parse::<OrderId>().unwrap(), OrderId(42));
        assert_eq!("0".parse::<OrderId>().unwrap(), OrderId(0));
        assert_eq!("007".parse::<OrderId>().unwrap(), OrderId(7));
    }

    #[test]
    fn test_order_id_rejects_malformed_values() {
        for raw in ["", "abc", "-5", "+5", "4.2", "1e3", " 42", "42 ", "0x10"] {
            let err = raw.parse::<OrderId>().unwrap_err();
            assert!(matches!(err, OrderError::MalformedId(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_order_id_rejects_overflow() {
        assert!("99999999999999999999999".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_line_item_deserializes_tagged_kinds() {
        let json = r#"[
            {"type": "product", "product_id": 9, "variation_id": 3, "quantity": 1},
            {"type": "fee", "name": "Gift wrap", "total_cents": 250}
        ]"#;

        let items: Vec<OrderLineItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items[0].kind(), LineItemKind::Product);
        assert_eq!(items[1].kind(), LineItemKind::Fee);

        let line = items[0].as_product().unwrap();
        assert_eq!(line.product_id, ProductId(9));
        assert_eq!(line.variation_id, Some(VariationId(3)));
        assert!(line.meta.is_empty());
    }

    #[test]
    fn test_display_number_falls_back_to_id() {
        let order = Order::new(OrderId(42), CustomerId(1), vec![]);
        assert_eq!(order.display_number(), "42");
        assert_eq!(order.with_number("A-0042").display_number(), "A-0042");
    }

    #[test]
    fn test_product_lines_preserves_order_and_skips_others() {
        let order = Order::new(
            OrderId(1),
            CustomerId(1),
            vec![
                OrderLineItem::Product(ProductLine::new(ProductId(7), 2)),
                OrderLineItem::Shipping { method: "flat_rate".into(), total_cents: 500 },
                OrderLineItem::Product(ProductLine::new(ProductId(9), 1).with_variation(VariationId(3))),
            ],
        );

        let ids: Vec<_> = order.product_lines().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![ProductId(7), ProductId(9)]);
    }
}
