// ============================================================================
// Domain Layer
// ============================================================================
//
// Value objects for the three collaborators a repeat touches:
// - order   - placed orders and their line items (read-only)
// - catalog - sellable products
// - cart    - the session cart and its confirmation notices
//
// ============================================================================

pub mod order;
pub mod catalog;
pub mod cart;
