//! Prometheus Metrics Registry - Pipeline Observability
//!
//! Registers and exposes Prometheus metrics for the poll/parse/execute
//! loop: cycle outcomes, submissions, rejections, and cycle latency.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::domain::trade::Direction;

/// Centralized Prometheus metrics for the bridge.
///
/// All metrics follow the naming convention `signal_bridge_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Cycles by outcome (`executed`, `idle`, or the failing stage).
    pub cycles: IntCounterVec,
    /// Orders accepted by the venue, by direction.
    pub orders_submitted: IntCounterVec,
    /// Orders the venue refused.
    pub orders_rejected: IntCounter,
    /// Wall time of one full cycle (milliseconds).
    pub cycle_latency_ms: HistogramVec,
    /// Consecutive cycles that ended in an error.
    pub consecutive_failures: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("signal_bridge_cycles_total", "Poll cycles by outcome"),
            &["outcome"],
        )?;

        let orders_submitted = IntCounterVec::new(
            Opts::new(
                "signal_bridge_orders_submitted_total",
                "Orders accepted by the execution venue",
            ),
            &["direction"],
        )?;

        let orders_rejected = IntCounter::new(
            "signal_bridge_orders_rejected_total",
            "Orders rejected by the execution venue",
        )?;

        let cycle_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "signal_bridge_cycle_latency_ms",
                "Poll cycle latency in milliseconds",
            )
            .buckets(vec![
                5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
            ]),
            &["outcome"],
        )?;

        let consecutive_failures = IntGauge::new(
            "signal_bridge_consecutive_failures",
            "Consecutive cycles that ended in an error",
        )?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(orders_submitted.clone()))?;
        registry.register(Box::new(orders_rejected.clone()))?;
        registry.register(Box::new(cycle_latency_ms.clone()))?;
        registry.register(Box::new(consecutive_failures.clone()))?;

        Ok(Self {
            registry,
            cycles,
            orders_submitted,
            orders_rejected,
            cycle_latency_ms,
            consecutive_failures,
        })
    }

    /// Record one finished cycle.
    pub fn observe_cycle(&self, outcome: &str, elapsed: Duration) {
        self.cycles.with_label_values(&[outcome]).inc();
        self.cycle_latency_ms
            .with_label_values(&[outcome])
            .observe(elapsed.as_secs_f64() * 1000.0);
    }

    /// Record an order the venue accepted.
    pub fn observe_submission(&self, direction: Direction) {
        self.orders_submitted
            .with_label_values(&[&direction.to_string()])
            .inc();
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics.render().map_err(|e| {
                        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                    })
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
