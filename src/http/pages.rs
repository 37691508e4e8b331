use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use maud::{html, Markup, DOCTYPE};

use crate::domain::order::{CustomerId, Order, OrderId, OrderLineItem};
use crate::store::{SessionId, StoreError};
use crate::ui::{self, Columns, Labels};
use super::AppState;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    #[error("Session missing from request")]
    NoSession,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            PageError::NoSession => StatusCode::BAD_REQUEST,
            PageError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn html_page(page_title: &str, content: Markup) -> HttpResponse {
    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (page_title) }
            }
            body { (content) }
        }
    };

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page.into_string())
}

fn item_count(order: &Order) -> u64 {
    order
        .product_lines()
        .fold(0u64, |total, l| total.saturating_add(u64::from(l.quantity)))
}

fn history_cell(key: &str, order: &Order, req: &HttpRequest, labels: &Labels) -> Markup {
    match key {
        "order-number" => html! {
            a href=(format!("/my-account/view-order/{}", order.id)) { "#" (order.display_number()) }
        },
        "order-items" => html! { (item_count(order)) },
        ui::REPEAT_COLUMN_KEY => {
            let href = ui::repeat_order_href(req.path(), req.query_string(), order.id);
            ui::repeat_order_column_content(&href, labels)
        }
        _ => html! {},
    }
}

/// Order history with the repeat column
pub async fn order_history(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, PageError> {
    let customer_id = CustomerId(path.into_inner());
    let orders = state.orders.orders_for_customer(customer_id).await?;
    let labels = &state.config.labels;

    let base: Columns = vec![
        ("order-number".to_string(), "Order".to_string()),
        ("order-items".to_string(), "Items".to_string()),
    ];
    let columns = ui::add_repeat_order_column(base, labels);

    let content = html! {
        table class="woocommerce-orders-table" {
            thead {
                tr {
                    @for (key, title) in &columns {
                        th class=(key) { (title) }
                    }
                }
            }
            tbody {
                @for order in &orders {
                    tr {
                        @for (key, _) in &columns {
                            td class=(key) { (history_cell(key, order, &req, labels)) }
                        }
                    }
                }
            }
        }
    };

    Ok(html_page("Orders", content))
}

fn line_description(item: &OrderLineItem) -> String {
    match item {
        OrderLineItem::Product(p) => match p.variation_id {
            Some(variation) => format!("Product {} (variation {}) × {}", p.product_id, variation, p.quantity),
            None => format!("Product {} × {}", p.product_id, p.quantity),
        },
        OrderLineItem::Fee { name, .. } => format!("Fee: {name}"),
        OrderLineItem::Shipping { method, .. } => format!("Shipping: {method}"),
        OrderLineItem::Tax { label, .. } => format!("Tax: {label}"),
        OrderLineItem::Coupon { code, .. } => format!("Coupon: {code}"),
    }
}

/// Single order details followed by the repeat prompt
pub async fn view_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, PageError> {
    let order_id = OrderId(path.into_inner());
    let order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or(PageError::OrderNotFound(order_id))?;

    let href = ui::repeat_order_href(req.path(), req.query_string(), order.id);
    let page_title = format!("Order #{}", order.display_number());

    let content = html! {
        h2 { (page_title) }
        ul class="order-details" {
            @for item in &order.items {
                li { (line_description(item)) }
            }
        }
        section class="woocommerce-customer-details" {}
        (ui::repeat_order_view_prompt(&href, &state.config.labels))
    };

    Ok(html_page(&page_title, content))
}

/// Cart contents plus any pending "added to cart" notices
pub async fn cart(
    state: web::Data<AppState>,
    session: Option<web::ReqData<SessionId>>,
) -> Result<HttpResponse, PageError> {
    let session_id = session.map(|s| s.into_inner()).ok_or(PageError::NoSession)?;
    let cart = state.sessions.cart(session_id).await;
    let notices = state.sessions.take_notices(session_id).await;

    let content = html! {
        @if !notices.is_empty() {
            ul class="woocommerce-message" {
                @for notice in &notices {
                    li { (notice.quantity) " × product " (notice.product_id) " has been added to your cart." }
                }
            }
        }
        @if cart.is_empty() {
            p class="cart-empty" { "Your cart is currently empty." }
        } @else {
            table class="shop_table cart" {
                @for line in cart.lines() {
                    tr data-key=(line.key) {
                        td { (line.name) }
                        td { (line.quantity) }
                    }
                }
            }
        }
    };

    Ok(html_page("Cart", content))
}
