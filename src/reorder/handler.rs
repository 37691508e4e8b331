use std::sync::Arc;
use std::time::Instant;

use crate::domain::cart::CartNotice;
use crate::domain::order::{Order, OrderId, OrderLineItem, ProductLine};
use crate::metrics::Metrics;
use crate::store::{Catalog, NoticeSink, OrderStore, SessionCart};

use super::filter::{IdentityFilter, OrderIdFilter};
use super::outcome::{LineOutcome, PassThrough, RepeatOrderOutcome, RepeatSummary, SkipReason};

/// Name of the request parameter carrying the order to repeat
pub const REPEAT_ORDER_PARAM: &str = "repeat-order";

// ============================================================================
// Repeat Order Handler
// ============================================================================

pub struct RepeatOrderHandler {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn Catalog>,
    filter: Arc<dyn OrderIdFilter>,
    cart_url: String,
    metrics: Option<Arc<Metrics>>,
}

impl RepeatOrderHandler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn Catalog>,
        cart_url: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            catalog,
            filter: Arc::new(IdentityFilter),
            cart_url: cart_url.into(),
            metrics: None,
        }
    }

    pub fn with_filter(mut self, filter: impl OrderIdFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cart_url(&self) -> &str {
        &self.cart_url
    }

    /// Run the repeat-order action for one request.
    ///
    /// `raw` is the value of the `repeat-order` parameter, if any. `cart` and
    /// `notices` belong to the requesting session.
    pub async fn handle(
        &self,
        raw: Option<&str>,
        cart: &dyn SessionCart,
        notices: &dyn NoticeSink,
    ) -> RepeatOrderOutcome {
        let started = Instant::now();
        let outcome = self.run(raw, cart, notices).await;

        if let Some(metrics) = &self.metrics {
            if !matches!(outcome, RepeatOrderOutcome::PassThrough(PassThrough::NotRequested)) {
                metrics.record_request(outcome.label(), started.elapsed().as_secs_f64());
            }
            if let RepeatOrderOutcome::Redirect(summary) = &outcome {
                for line in &summary.lines {
                    metrics.record_line(line.label());
                }
            }
        }

        outcome
    }

    async fn run(
        &self,
        raw: Option<&str>,
        cart: &dyn SessionCart,
        notices: &dyn NoticeSink,
    ) -> RepeatOrderOutcome {
        let Some(raw) = raw else {
            return RepeatOrderOutcome::PassThrough(PassThrough::NotRequested);
        };

        let requested: OrderId = match raw.parse() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring repeat-order request");
                return RepeatOrderOutcome::PassThrough(PassThrough::MalformedId(raw.to_string()));
            }
        };

        let order_id = self.filter.apply(requested);
        if order_id != requested {
            tracing::debug!(requested = %requested, order_id = %order_id, "Order id rewritten by filter");
        }

        let order = match self.load_order(order_id).await {
            Some(order) => order,
            None => return RepeatOrderOutcome::PassThrough(PassThrough::OrderNotFound(order_id)),
        };

        if order.is_empty() {
            tracing::debug!(order_id = %order_id, "Order has no line items");
            return RepeatOrderOutcome::PassThrough(PassThrough::EmptyOrder(order_id));
        }

        // A repeat always starts from an empty cart, even if nothing gets added
        if let Err(e) = cart.empty().await {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to empty cart, not repeating");
            return RepeatOrderOutcome::PassThrough(PassThrough::CartUnavailable(order_id));
        }

        let mut lines = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let outcome = self.copy_line(item, cart).await;

            match &outcome {
                LineOutcome::Added { product_id, quantity, .. } => {
                    notices.push(CartNotice::added(*product_id, *quantity)).await;
                }
                LineOutcome::Skipped(reason) => {
                    tracing::debug!(order_id = %order_id, reason = ?reason, "Skipped order line");
                }
            }

            lines.push(outcome);
        }

        let summary = RepeatSummary {
            order_id,
            location: self.cart_url.clone(),
            lines,
        };

        tracing::info!(
            order_id = %order_id,
            added = summary.added_count(),
            skipped = summary.skipped_count(),
            "Repeated order into cart"
        );

        RepeatOrderOutcome::Redirect(summary)
    }

    async fn load_order(&self, order_id: OrderId) -> Option<Order> {
        match self.orders.get_order(order_id).await {
            Ok(Some(order)) => Some(order),
            Ok(None) => {
                tracing::debug!(order_id = %order_id, "Order not found");
                None
            }
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Order lookup failed");
                None
            }
        }
    }

    async fn copy_line(&self, item: &OrderLineItem, cart: &dyn SessionCart) -> LineOutcome {
        let line: &ProductLine = match item {
            OrderLineItem::Product(line) => line,
            other => return LineOutcome::Skipped(SkipReason::NotAProduct(other.kind())),
        };

        let unavailable = || {
            LineOutcome::Skipped(SkipReason::ProductUnavailable {
                product_id: line.product_id,
                variation_id: line.variation_id,
            })
        };

        match self.catalog.resolve(line.product_id, line.variation_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return unavailable(),
            Err(e) => {
                tracing::warn!(product_id = %line.product_id, error = %e, "Catalog lookup failed");
                return unavailable();
            }
        }

        match cart.add(line.product_id, line.quantity, line.variation_id).await {
            Ok(key) => LineOutcome::Added {
                key,
                product_id: line.product_id,
                variation_id: line.variation_id,
                quantity: line.quantity,
            },
            Err(error) => LineOutcome::Skipped(SkipReason::Rejected {
                product_id: line.product_id,
                error,
            }),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::cart::{CartError, CartLineKey};
    use crate::domain::catalog::Product;
    use crate::domain::order::{CustomerId, LineItemKind, ProductId, VariationId};
    use crate::store::{InMemoryCatalog, InMemoryOrderStore, SessionHandle, SessionId, SessionStore, StoreError};

    const CART_URL: &str = "https://shop.example/cart/";

    struct Fixture {
        orders: Arc<InMemoryOrderStore>,
        catalog: Arc<InMemoryCatalog>,
        session: SessionHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Arc::new(InMemoryCatalog::with_products(vec![
                Product::new(ProductId(7), "Mate"),
                Product::new(ProductId(9), "Bombilla").with_variation(VariationId(3)),
                Product::new(ProductId(11), "Yerba").with_stock(1),
            ]));
            let sessions = Arc::new(SessionStore::new(catalog.clone()));
            Self {
                orders: Arc::new(InMemoryOrderStore::new()),
                catalog,
                session: sessions.handle(SessionId::generate()),
            }
        }

        fn handler(&self) -> RepeatOrderHandler {
            RepeatOrderHandler::new(self.orders.clone(), self.catalog.clone(), CART_URL)
        }

        async fn repeat(&self, raw: Option<&str>) -> RepeatOrderOutcome {
            self.handler().handle(raw, &self.session, &self.session).await
        }
    }

    fn product(id: u64, quantity: u32) -> OrderLineItem {
        OrderLineItem::Product(ProductLine::new(ProductId(id), quantity))
    }

    fn fee() -> OrderLineItem {
        OrderLineItem::Fee { name: "Gift wrap".into(), total_cents: 250 }
    }

    fn order_42() -> Order {
        Order::new(
            OrderId(42),
            CustomerId(1),
            vec![
                product(7, 2),
                OrderLineItem::Product(ProductLine::new(ProductId(9), 1).with_variation(VariationId(3))),
                fee(),
            ],
        )
    }

    fn cart_identities(cart: &crate::domain::cart::Cart) -> Vec<(ProductId, Option<VariationId>, u32)> {
        cart.lines()
            .iter()
            .map(|l| (l.product_id, l.variation_id, l.quantity))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_or_malformed_param_is_pass_through() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        fx.session.add(ProductId(7), 1, None).await.unwrap();

        for raw in [None, Some(""), Some("abc"), Some("-42"), Some("4.2"), Some("42abc")] {
            let outcome = fx.repeat(raw).await;
            assert!(outcome.redirect_location().is_none(), "redirected for {raw:?}");
            assert!(!outcome.requires_no_cache());
        }

        assert_eq!(fx.session.cart().await.len(), 1);
        assert!(fx.session.take_notices().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_is_pass_through() {
        let fx = Fixture::new();
        fx.session.add(ProductId(7), 1, None).await.unwrap();

        let outcome = fx.repeat(Some("404")).await;

        assert_eq!(outcome, RepeatOrderOutcome::PassThrough(PassThrough::OrderNotFound(OrderId(404))));
        assert!(outcome.requires_no_cache());
        assert_eq!(fx.session.cart().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_order_is_pass_through() {
        let fx = Fixture::new();
        fx.orders.insert(Order::new(OrderId(5), CustomerId(1), vec![])).await;
        fx.session.add(ProductId(7), 1, None).await.unwrap();

        let outcome = fx.repeat(Some("5")).await;

        assert_eq!(outcome, RepeatOrderOutcome::PassThrough(PassThrough::EmptyOrder(OrderId(5))));
        assert_eq!(fx.session.cart().await.len(), 1);
    }

    #[tokio::test]
    async fn test_order_42_copies_product_lines_in_order() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;

        let outcome = fx.repeat(Some("42")).await;

        assert_eq!(outcome.redirect_location(), Some(CART_URL));
        assert_eq!(
            cart_identities(&fx.session.cart().await),
            vec![(ProductId(7), None, 2), (ProductId(9), Some(VariationId(3)), 1)]
        );

        let RepeatOrderOutcome::Redirect(summary) = outcome else {
            panic!("expected redirect");
        };
        assert_eq!(summary.added_count(), 2);
        assert_eq!(summary.lines[2], LineOutcome::Skipped(SkipReason::NotAProduct(LineItemKind::Fee)));
    }

    #[tokio::test]
    async fn test_one_notice_per_added_line() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;

        fx.repeat(Some("42")).await;

        let notices: Vec<_> = fx
            .session
            .take_notices()
            .await
            .into_iter()
            .map(|n| (n.product_id, n.quantity))
            .collect();
        assert_eq!(notices, vec![(ProductId(7), 2), (ProductId(9), 1)]);
    }

    #[tokio::test]
    async fn test_existing_cart_is_replaced() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        fx.session.add(ProductId(11), 1, None).await.unwrap();

        fx.repeat(Some("42")).await;

        let products: Vec<_> = fx.session.cart().await.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(products, vec![ProductId(7), ProductId(9)]);
    }

    #[tokio::test]
    async fn test_second_repeat_replaces_first() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        fx.orders
            .insert(Order::new(OrderId(43), CustomerId(1), vec![product(11, 1)]))
            .await;

        fx.repeat(Some("42")).await;
        fx.repeat(Some("43")).await;

        assert_eq!(cart_identities(&fx.session.cart().await), vec![(ProductId(11), None, 1)]);
    }

    #[tokio::test]
    async fn test_unavailable_and_rejected_lines_are_skipped() {
        let fx = Fixture::new();
        fx.orders
            .insert(Order::new(
                OrderId(50),
                CustomerId(1),
                vec![
                    product(100, 1), // not in catalog
                    product(11, 5),  // only 1 in stock
                    OrderLineItem::Product(ProductLine::new(ProductId(9), 1).with_variation(VariationId(4))),
                    product(7, 1),
                ],
            ))
            .await;

        let RepeatOrderOutcome::Redirect(summary) = fx.repeat(Some("50")).await else {
            panic!("expected redirect");
        };

        assert_eq!(summary.added_count(), 1);
        assert_eq!(
            summary.lines[0],
            LineOutcome::Skipped(SkipReason::ProductUnavailable { product_id: ProductId(100), variation_id: None })
        );
        assert!(matches!(
            summary.lines[1],
            LineOutcome::Skipped(SkipReason::Rejected { error: CartError::InsufficientStock { .. }, .. })
        ));
        assert!(matches!(summary.lines[2], LineOutcome::Skipped(SkipReason::ProductUnavailable { .. })));
        assert_eq!(cart_identities(&fx.session.cart().await), vec![(ProductId(7), None, 1)]);
        assert_eq!(fx.session.take_notices().await.len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_resolvable_still_empties_cart_and_redirects() {
        let fx = Fixture::new();
        fx.orders
            .insert(Order::new(OrderId(60), CustomerId(1), vec![product(100, 1), fee()]))
            .await;
        fx.session.add(ProductId(7), 3, None).await.unwrap();

        let outcome = fx.repeat(Some("60")).await;

        assert_eq!(outcome.redirect_location(), Some(CART_URL));
        assert!(fx.session.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_filter_rewrites_order_id() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;

        let handler = fx.handler().with_filter(|id: OrderId| OrderId(id.value() + 41));
        let outcome = handler.handle(Some("1"), &fx.session, &fx.session).await;

        assert_eq!(outcome.redirect_location(), Some(CART_URL));
        assert_eq!(fx.session.cart().await.len(), 2);
    }

    #[tokio::test]
    async fn test_metrics_are_recorded() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        let metrics = Arc::new(Metrics::new().unwrap());
        let handler = fx.handler().with_metrics(metrics.clone());

        handler.handle(Some("42"), &fx.session, &fx.session).await;
        handler.handle(Some("404"), &fx.session, &fx.session).await;
        handler.handle(None, &fx.session, &fx.session).await;

        assert_eq!(metrics.requests_total.with_label_values(&["redirected"]).get(), 1);
        assert_eq!(metrics.requests_total.with_label_values(&["order_not_found"]).get(), 1);
        assert_eq!(metrics.requests_total.with_label_values(&["not_requested"]).get(), 0);
        assert_eq!(metrics.lines_total.with_label_values(&["added"]).get(), 2);
        assert_eq!(metrics.lines_total.with_label_values(&["not_a_product"]).get(), 1);
    }

    // ------------------------------------------------------------------------
    // Failing collaborators
    // ------------------------------------------------------------------------

    struct BrokenOrders;

    #[async_trait]
    impl OrderStore for BrokenOrders {
        async fn get_order(&self, _id: OrderId) -> Result<Option<Order>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn orders_for_customer(&self, _customer_id: CustomerId) -> Result<Vec<Order>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl Catalog for BrokenCatalog {
        async fn resolve(
            &self,
            _product_id: ProductId,
            _variation_id: Option<VariationId>,
        ) -> Result<Option<crate::domain::catalog::Product>, StoreError> {
            Err(StoreError::Unavailable("timeout".into()))
        }
    }

    /// Accepts every product but refuses every insertion
    struct RejectingCart;

    #[async_trait]
    impl SessionCart for RejectingCart {
        async fn empty(&self) -> Result<(), CartError> {
            Ok(())
        }

        async fn add(
            &self,
            product_id: ProductId,
            _quantity: u32,
            _variation_id: Option<VariationId>,
        ) -> Result<CartLineKey, CartError> {
            Err(CartError::NotPurchasable(product_id))
        }
    }

    /// Holds a fixed set of lines and cannot be cleared
    struct StuckCart {
        lines: std::sync::Mutex<Vec<ProductId>>,
    }

    #[async_trait]
    impl SessionCart for StuckCart {
        async fn empty(&self) -> Result<(), CartError> {
            Err(CartError::Backend("session storage offline".into()))
        }

        async fn add(
            &self,
            product_id: ProductId,
            _quantity: u32,
            variation_id: Option<VariationId>,
        ) -> Result<CartLineKey, CartError> {
            self.lines.lock().unwrap().push(product_id);
            Ok(CartLineKey::for_item(product_id, variation_id))
        }
    }

    #[tokio::test]
    async fn test_failed_clear_aborts_without_adding() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        let cart = StuckCart { lines: std::sync::Mutex::new(vec![ProductId(11)]) };

        let outcome = fx.handler().handle(Some("42"), &cart, &fx.session).await;

        assert_eq!(outcome, RepeatOrderOutcome::PassThrough(PassThrough::CartUnavailable(OrderId(42))));
        assert!(outcome.redirect_location().is_none());
        assert!(outcome.requires_no_cache());
        assert_eq!(*cart.lines.lock().unwrap(), vec![ProductId(11)]);
        assert!(fx.session.take_notices().await.is_empty());
    }

    #[tokio::test]
    async fn test_order_store_failure_is_not_found() {
        let fx = Fixture::new();
        let handler = RepeatOrderHandler::new(Arc::new(BrokenOrders), fx.catalog.clone(), CART_URL);

        let outcome = handler.handle(Some("42"), &fx.session, &fx.session).await;

        assert_eq!(outcome, RepeatOrderOutcome::PassThrough(PassThrough::OrderNotFound(OrderId(42))));
    }

    #[tokio::test]
    async fn test_catalog_failure_skips_lines() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;
        let handler = RepeatOrderHandler::new(fx.orders.clone(), Arc::new(BrokenCatalog), CART_URL);

        let outcome = handler.handle(Some("42"), &fx.session, &fx.session).await;

        assert_eq!(outcome.redirect_location(), Some(CART_URL));
        assert!(fx.session.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_every_insertion_rejected_still_redirects() {
        let fx = Fixture::new();
        fx.orders.insert(order_42()).await;

        let outcome = fx.handler().handle(Some("42"), &RejectingCart, &fx.session).await;

        let RepeatOrderOutcome::Redirect(summary) = outcome else {
            panic!("expected redirect");
        };
        assert_eq!(summary.added_count(), 0);
        assert_eq!(summary.location, CART_URL);
        assert!(fx.session.take_notices().await.is_empty());
    }
}
