//! Signal Bridge - Entry Point
//!
//! Polls a decision service for trade instructions and places them on
//! an execution venue. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config (path from SIGNAL_BRIDGE_CONFIG, default config.toml)
//! 2. Init tracing (JSON or plain structured logging)
//! 3. Create the HTTP signal source
//! 4. Create the execution venue (REST bridge or paper)
//! 5. Spawn metrics (:9090) and health (:8080) servers if enabled
//! 6. Spawn the poller
//! 7. Wait for SIGINT, then let the in-flight cycle finish

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use signal_bridge::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use signal_bridge::adapters::signal::{HttpOutcomeReporter, HttpSignalSource};
use signal_bridge::adapters::venue::{PaperVenue, RestVenue, RestVenueConfig};
use signal_bridge::config::{self, AppConfig, VenueKind};
use signal_bridge::ports::venue::ExecutionVenue;
use signal_bridge::usecases::{Poller, SignalPipeline};

/// Upper bound on waiting for the in-flight cycle at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&config::loader::config_path())
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        url = %config.signal.url,
        venue = ?config.venue.kind,
        "Starting signal bridge"
    );

    // ── 3. Signal source ────────────────────────────────────
    let source = Arc::new(
        HttpSignalSource::new(config.signal.url.clone(), config.signal.timeout())
            .context("Failed to create signal source")?,
    );

    // ── 4. Venue + run ──────────────────────────────────────
    match config.venue.kind {
        VenueKind::Rest => {
            let venue_config = RestVenueConfig::from_venue_config(&config.venue)?;
            let venue = Arc::new(RestVenue::new(venue_config).context("Failed to create venue client")?);
            run_with_venue(config, source, venue).await
        }
        VenueKind::Paper => {
            warn!("Paper venue selected: orders are simulated");
            let venue = Arc::new(PaperVenue::new(config.venue.instruments.clone()));
            run_with_venue(config, source, venue).await
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.bot.log_level));

    if config.bot.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Spawn servers and the poller for a concrete venue, then wait for SIGINT.
async fn run_with_venue<V: ExecutionVenue>(
    config: AppConfig,
    source: Arc<HttpSignalSource>,
    venue: Arc<V>,
) -> Result<()> {
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());

    let mut pipeline = SignalPipeline::from_config(source, venue, &config);
    if let Some(feedback_url) = &config.signal.feedback_url {
        let reporter = HttpOutcomeReporter::new(feedback_url.clone(), config.signal.timeout())
            .context("Failed to create outcome reporter")?;
        info!(url = %feedback_url, "Execution feedback enabled");
        pipeline = pipeline.with_reporter(Arc::new(reporter));
    }

    // ── 5. Metrics + health servers ─────────────────────────
    let mut server_handles = Vec::new();
    if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
        pipeline = pipeline.with_metrics(Arc::clone(&metrics));

        let bind = config.metrics.bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        server_handles.push(tokio::spawn(async move {
            if let Err(e) = metrics.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }));

        let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
        let health_shutdown = shutdown_tx.subscribe();
        server_handles.push(tokio::spawn(async move {
            if let Err(e) = health_server.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }));
    }

    // ── 6. Poller ───────────────────────────────────────────
    let mut poller = Poller::new(
        pipeline,
        config.signal.poll_interval(),
        shutdown_tx.subscribe(),
        Arc::clone(&health),
    );
    let mut poller_handle = tokio::spawn(async move { poller.run().await });

    info!("Bridge is running");

    // ── 7. Wait for SIGINT or an early poller exit ──────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        joined = &mut poller_handle => {
            let _ = shutdown_tx.send(());
            for handle in server_handles {
                handle.abort();
            }
            return match joined {
                Ok(Ok(stats)) => {
                    info!(?stats, "Poller exited");
                    Ok(())
                }
                Ok(Err(e)) => Err(e.context("Poller failed")),
                Err(e) => Err(anyhow::anyhow!("Poller task panicked: {e}")),
            };
        }
    }

    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    match tokio::time::timeout(SHUTDOWN_GRACE, poller_handle).await {
        Ok(Ok(Ok(stats))) => info!(?stats, "Poller stopped cleanly"),
        Ok(Ok(Err(e))) => warn!(error = %e, "Poller ended with error"),
        Ok(Err(e)) => warn!(error = %e, "Poller task panicked"),
        Err(_) => warn!("Poller did not stop within grace period"),
    }

    for handle in server_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
