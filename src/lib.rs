//! Repeat a previous order: copy its product lines back into the customer's
//! cart and send them to the cart page.
//!
//! The core is [`reorder::RepeatOrderHandler`]; [`http`] wires it into an
//! actix-web application as a middleware that runs on every page, plus the
//! account pages that render the "repeat" buttons.

pub mod config;
pub mod domain;
pub mod http;
pub mod metrics;
pub mod reorder;
pub mod store;
pub mod ui;

pub use config::{AppConfig, ConfigError};
pub use reorder::{RepeatOrderHandler, RepeatOrderOutcome, REPEAT_ORDER_PARAM};
