use crate::domain::cart::{CartError, CartLineKey};
use crate::domain::order::{LineItemKind, OrderId, ProductId, VariationId};

// ============================================================================
// Repeat Outcomes
// ============================================================================

/// Why a request went through without touching the cart
#[derive(Debug, Clone, PartialEq)]
pub enum PassThrough {
    /// No `repeat-order` parameter on the request
    NotRequested,
    /// Parameter present but not a non-negative integer
    MalformedId(String),
    /// No order for the (filtered) id, or the store failed to answer
    OrderNotFound(OrderId),
    /// The order has no line items
    EmptyOrder(OrderId),
    /// The session cart could not be emptied; nothing was copied
    CartUnavailable(OrderId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotAProduct(LineItemKind),
    ProductUnavailable {
        product_id: ProductId,
        variation_id: Option<VariationId>,
    },
    Rejected {
        product_id: ProductId,
        error: CartError,
    },
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NotAProduct(_) => "not_a_product",
            SkipReason::ProductUnavailable { .. } => "product_unavailable",
            SkipReason::Rejected { .. } => "rejected",
        }
    }
}

/// Result of copying one order line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Added {
        key: CartLineKey,
        product_id: ProductId,
        variation_id: Option<VariationId>,
        quantity: u32,
    },
    Skipped(SkipReason),
}

impl LineOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, LineOutcome::Added { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineOutcome::Added { .. } => "added",
            LineOutcome::Skipped(reason) => reason.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSummary {
    pub order_id: OrderId,
    /// Redirect target (the cart page)
    pub location: String,
    /// One entry per order line, in stored order
    pub lines: Vec<LineOutcome>,
}

impl RepeatSummary {
    pub fn added_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_added()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.lines.len() - self.added_count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepeatOrderOutcome {
    PassThrough(PassThrough),
    Redirect(RepeatSummary),
}

impl RepeatOrderOutcome {
    /// Whether the response must carry no-cache headers.
    ///
    /// True as soon as the parameter was well-formed, redirect or not.
    pub fn requires_no_cache(&self) -> bool {
        !matches!(
            self,
            RepeatOrderOutcome::PassThrough(PassThrough::NotRequested)
                | RepeatOrderOutcome::PassThrough(PassThrough::MalformedId(_))
        )
    }

    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            RepeatOrderOutcome::Redirect(summary) => Some(&summary.location),
            RepeatOrderOutcome::PassThrough(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepeatOrderOutcome::PassThrough(PassThrough::NotRequested) => "not_requested",
            RepeatOrderOutcome::PassThrough(PassThrough::MalformedId(_)) => "malformed_id",
            RepeatOrderOutcome::PassThrough(PassThrough::OrderNotFound(_)) => "order_not_found",
            RepeatOrderOutcome::PassThrough(PassThrough::EmptyOrder(_)) => "empty_order",
            RepeatOrderOutcome::PassThrough(PassThrough::CartUnavailable(_)) => "cart_unavailable",
            RepeatOrderOutcome::Redirect(_) => "redirected",
        }
    }
}
