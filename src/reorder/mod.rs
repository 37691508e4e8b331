// ============================================================================
// Repeat Order - copy a placed order back into the session cart
// ============================================================================
//
// Flow: parameter -> OrderId -> filter -> order lookup -> empty cart
//       -> per line: resolve product, add to cart, notify -> redirect
//
// Anything wrong with the parameter or the order is a pass-through (the page
// renders as if nothing happened). Anything wrong with a single line skips
// that line only. A cart that cannot be emptied is a pass-through too. Once
// the cart has been emptied the request always ends in a redirect to the cart.
//
// ============================================================================

mod filter;
mod handler;
mod outcome;

pub use filter::{IdentityFilter, OrderIdFilter};
pub use handler::{RepeatOrderHandler, REPEAT_ORDER_PARAM};
pub use outcome::{LineOutcome, PassThrough, RepeatOrderOutcome, RepeatSummary, SkipReason};
