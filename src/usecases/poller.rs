//! Poller - Fixed-interval Single-flight Cycle Driver
//!
//! Fires one pipeline cycle per interval. The cycle is awaited inside
//! the select branch, so a slow cycle swallows the ticks that elapse
//! while it runs (`MissedTickBehavior::Skip`) and shutdown is observed
//! only between cycles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use super::pipeline::{CycleOutcome, SignalPipeline};
use crate::adapters::metrics::HealthState;
use crate::ports::signal_source::SignalSource;
use crate::ports::venue::ExecutionVenue;

/// Counters returned when the poller stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
  /// Cycles started.
  pub cycles: u64,
  /// Cycles that placed an order.
  pub executed: u64,
  /// Cycles with no pending signal.
  pub idle: u64,
  /// Cycles abandoned on an error.
  pub skipped: u64,
}

/// Drives the pipeline on a timer until shutdown.
pub struct Poller<S: SignalSource, V: ExecutionVenue> {
  /// Cycle pipeline.
  pipeline: SignalPipeline<S, V>,
  /// Trigger period.
  interval: Duration,
  /// Shutdown signal receiver.
  shutdown_rx: broadcast::Receiver<()>,
  /// Readiness flags shared with the health server.
  health: Arc<HealthState>,
  /// Current run of failed cycles.
  consecutive_failures: u64,
}

impl<S: SignalSource, V: ExecutionVenue> Poller<S, V> {
  /// Create a new poller.
  pub fn new(
    pipeline: SignalPipeline<S, V>,
    interval: Duration,
    shutdown_rx: broadcast::Receiver<()>,
    health: Arc<HealthState>,
  ) -> Self {
    Self {
      pipeline,
      interval,
      shutdown_rx,
      health,
      consecutive_failures: 0,
    }
  }

  /// Run until the shutdown signal fires.
  ///
  /// # Errors
  /// Fails before the first cycle if the venue is not healthy.
  #[instrument(skip(self), name = "poller", fields(interval_ms = self.interval.as_millis() as u64))]
  pub async fn run(&mut self) -> Result<PollerStats> {
    if !self.pipeline.venue().is_healthy().await {
      self.health.set_venue_connected(false);
      bail!("Execution venue is not reachable, refusing to start");
    }
    self.health.set_venue_connected(true);
    self.health.set_poller_running(true);
    info!("Poller started");

    let mut ticker = interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = PollerStats::default();

    loop {
      tokio::select! {
        biased;

        _ = self.shutdown_rx.recv() => {
          info!("Shutdown signal received, stopping poller");
          break;
        }
        _ = ticker.tick() => {
          stats.cycles += 1;
          let outcome = self.pipeline.tick().await;
          self.record(&mut stats, &outcome);
        }
      }
    }

    self.health.set_poller_running(false);
    info!(
      cycles = stats.cycles,
      executed = stats.executed,
      idle = stats.idle,
      skipped = stats.skipped,
      "Poller stopped"
    );
    Ok(stats)
  }

  fn record(&mut self, stats: &mut PollerStats, outcome: &CycleOutcome) {
    match outcome {
      CycleOutcome::Executed(_) => stats.executed += 1,
      CycleOutcome::Idle => stats.idle += 1,
      CycleOutcome::Skipped(_) => stats.skipped += 1,
    }

    if matches!(outcome, CycleOutcome::Skipped(_)) {
      self.consecutive_failures += 1;
      if self.consecutive_failures % 10 == 0 {
        warn!(consecutive = self.consecutive_failures, "Cycles keep failing");
      }
    } else {
      if self.consecutive_failures > 0 {
        info!(after = self.consecutive_failures, "Cycle succeeded after failures");
      }
      self.consecutive_failures = 0;
    }

    if let Some(metrics) = self.pipeline.metrics() {
      metrics
        .consecutive_failures
        .set(i64::try_from(self.consecutive_failures).unwrap_or(i64::MAX));
    }
  }
}
