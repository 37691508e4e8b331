// ============================================================================
// Presentation - repeat-order touchpoints in the account pages
// ============================================================================
//
// - an `order-repeat` column in the order history, with a button per order
// - a prompt and button under the customer details of a single order
//
// Both buttons link (relatively) to the current page with `repeat-order=<id>`
// added; the request middleware picks the parameter up on the next page load.
//
// ============================================================================

use maud::{html, Markup};
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderId;
use crate::reorder::REPEAT_ORDER_PARAM;

/// Key of the column added to the order history table
pub const REPEAT_COLUMN_KEY: &str = "order-repeat";

const BUTTON_CLASS: &str = "woocommerce-button button view";

/// Copy shown to customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub column_title: String,
    pub column_button: String,
    /// Paragraph above the order-detail button; omitted when empty
    pub view_order_text: String,
    pub view_order_button: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            column_title: "Repetir orden".to_string(),
            column_button: "Repetir".to_string(),
            view_order_text:
                "Para repetir la orden hace click en el siguiente botón y serás redirigido al carrito"
                    .to_string(),
            view_order_button: "Repetir orden".to_string(),
        }
    }
}

/// Ordered (key, title) pairs of the order history table
pub type Columns = Vec<(String, String)>;

/// Appends the repeat column, replacing any column already using its key
pub fn add_repeat_order_column(mut columns: Columns, labels: &Labels) -> Columns {
    columns.retain(|(key, _)| key != REPEAT_COLUMN_KEY);
    columns.push((REPEAT_COLUMN_KEY.to_string(), labels.column_title.clone()));
    columns
}

/// Relative link to the current page (`path` + `query`) with
/// `repeat-order=<id>` set, keeping every other parameter
pub fn repeat_order_href(path: &str, query: &str, order_id: OrderId) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(
            url::form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| key != REPEAT_ORDER_PARAM),
        )
        .append_pair(REPEAT_ORDER_PARAM, &order_id.to_string())
        .finish();

    format!("{path}?{query}")
}

fn button(href: &str, label: &str) -> Markup {
    html! {
        a href=(href) class=(BUTTON_CLASS) { (label) }
    }
}

/// Cell content of the repeat column for one order
pub fn repeat_order_column_content(href: &str, labels: &Labels) -> Markup {
    button(href, &labels.column_button)
}

/// Prompt rendered after the customer details of a single order
pub fn repeat_order_view_prompt(href: &str, labels: &Labels) -> Markup {
    html! {
        @if !labels.view_order_text.is_empty() {
            p { (labels.view_order_text) }
        }
        (button(href, &labels.view_order_button))
    }
}
