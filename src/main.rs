use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repeat_orders::http::{self, AppState};
use repeat_orders::metrics::Metrics;
use repeat_orders::store::{Catalog, OrderStore, SeedData, SessionStore};
use repeat_orders::{AppConfig, RepeatOrderHandler};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,repeat_orders=debug")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(cart_url = %config.cart.cart_url, "Starting repeat-orders service");

    // === 1. Stores ===
    let seed = match &config.seed.path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading seed data");
            SeedData::load(path)?
        }
        None => SeedData::default(),
    };
    tracing::info!(
        orders = seed.orders.len(),
        products = seed.products.len(),
        "In-memory stores ready"
    );
    let (orders, catalog) = seed.into_stores();
    let orders: Arc<dyn OrderStore> = Arc::new(orders);
    let catalog: Arc<dyn Catalog> = Arc::new(catalog);
    let sessions = Arc::new(
        SessionStore::new(catalog.clone())
            .with_idle_ttl(chrono::Duration::seconds(config.session.idle_ttl_secs as i64)),
    );

    // Evict idle sessions
    let sweeper = sessions.clone();
    let sweep_every = std::time::Duration::from_secs(config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweeper.sweep_idle().await;
        }
    });

    // === 2. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Repeat-order handler ===
    let handler = Arc::new(
        RepeatOrderHandler::new(orders.clone(), catalog, config.cart.cart_url.clone())
            .with_metrics(metrics.clone()),
    );

    let state = web::Data::new(AppState {
        config: config.clone(),
        handler,
        orders,
        sessions,
    });
    let metrics = web::Data::new(metrics);

    let (host, port) = config.bind_address();
    tracing::info!("Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(metrics.clone())
            .wrap(middleware::from_fn(http::repeat_order_middleware))
            .configure(http::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
