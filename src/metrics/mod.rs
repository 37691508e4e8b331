// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for the repeat-order action
// ============================================================================
//
// - repeat_order_requests_total{outcome}   - one per request carrying the param
// - repeat_order_lines_total{result}       - one per order line considered
// - repeat_order_duration_seconds{outcome} - handler latency
//
// Scraped via GET /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub requests_total: IntCounterVec,
    pub lines_total: IntCounterVec,
    pub duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("repeat_order_requests_total", "Repeat-order requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let lines_total = IntCounterVec::new(
            Opts::new("repeat_order_lines_total", "Order lines considered for copying, by result"),
            &["result"],
        )?;
        registry.register(Box::new(lines_total.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new("repeat_order_duration_seconds", "Repeat-order handling duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            lines_total,
            duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_request(&self, outcome: &str, duration_secs: f64) {
        self.requests_total.with_label_values(&[outcome]).inc();
        self.duration.with_label_values(&[outcome]).observe(duration_secs);
    }

    pub fn record_line(&self, result: &str) {
        self.lines_total.with_label_values(&[result]).inc();
    }
}
