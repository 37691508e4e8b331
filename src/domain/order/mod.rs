// ============================================================================
// Order Domain
// ============================================================================
//
// Read-only view of placed orders:
// - Value objects (OrderId, OrderLineItem, ProductLine, Order)
// - Errors (OrderError)
//
// ============================================================================

pub mod value_objects;
pub mod errors;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
