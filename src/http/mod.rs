// ============================================================================
// HTTP Surface (actix-web)
// ============================================================================
//
// - middleware - runs the repeat-order action ahead of every page
// - session    - cookie-based session ids
// - pages      - order history, single order, cart
//
// ============================================================================

mod middleware;
mod pages;
mod session;

use actix_web::web;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::{health_handler, metrics_handler};
use crate::reorder::RepeatOrderHandler;
use crate::store::{OrderStore, SessionStore};

pub use middleware::{repeat_order_middleware, repeat_order_param};
pub use pages::PageError;
pub use session::{resolve_session, session_cookie};

/// Shared application state, registered as `web::Data<AppState>`
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub handler: Arc<RepeatOrderHandler>,
    pub orders: Arc<dyn OrderStore>,
    pub sessions: Arc<SessionStore>,
}

/// Route table. Wrap the app with `middleware::from_fn(repeat_order_middleware)`
/// so the action runs on every page.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/my-account/orders/{customer_id}", web::get().to(pages::order_history))
        .route("/my-account/view-order/{order_id}", web::get().to(pages::view_order))
        .route("/cart", web::get().to(pages::cart))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler));
}
