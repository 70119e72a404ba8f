//! Signal Pipeline - One Poll Cycle
//!
//! fetch -> parse -> normalize -> submit, strictly in that order and
//! each stage awaited before the next starts. Any stage failure ends the
//! cycle; nothing carries over to the next one. When a reporter is
//! attached, every venue answer is posted back once after submission.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use super::normalizer::Normalizer;
use super::submitter::ExecutionSubmitter;
use crate::adapters::metrics::MetricsRegistry;
use crate::config::AppConfig;
use crate::domain::parser::SignalParser;
use crate::domain::trade::{ExecutionResult, TradeSignal};
use crate::errors::{CycleError, ExecutionError, ParseError};
use crate::ports::outcome::{OutcomeReport, OutcomeReporter};
use crate::ports::signal_source::SignalSource;
use crate::ports::venue::ExecutionVenue;

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
  /// An order was placed.
  Executed(ExecutionResult),
  /// The decision service had nothing queued.
  Idle,
  /// A stage failed; the cycle was abandoned.
  Skipped(CycleError),
}

impl CycleOutcome {
  /// Label used for metrics.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::Executed(_) => "executed",
      Self::Idle => "idle",
      Self::Skipped(e) => e.kind(),
    }
  }
}

/// Wires the signal source, parser, normalizer and submitter together.
pub struct SignalPipeline<S: SignalSource, V: ExecutionVenue> {
  source: Arc<S>,
  venue: Arc<V>,
  parser: SignalParser,
  normalizer: Normalizer<V>,
  submitter: ExecutionSubmitter<V>,
  metrics: Option<Arc<MetricsRegistry>>,
  reporter: Option<Arc<dyn OutcomeReporter>>,
}

impl<S: SignalSource, V: ExecutionVenue> SignalPipeline<S, V> {
  /// Create a pipeline from explicit parts.
  pub fn new(
    source: Arc<S>,
    venue: Arc<V>,
    parser: SignalParser,
    normalizer: Normalizer<V>,
    submitter: ExecutionSubmitter<V>,
  ) -> Self {
    Self {
      source,
      venue,
      parser,
      normalizer,
      submitter,
      metrics: None,
      reporter: None,
    }
  }

  /// Create a pipeline configured from `[signal]` and `[order]`.
  pub fn from_config(source: Arc<S>, venue: Arc<V>, config: &AppConfig) -> Self {
    Self::new(
      source,
      Arc::clone(&venue),
      SignalParser::new(config.signal.parse_mode),
      Normalizer::new(Arc::clone(&venue), config.order.snap_volume),
      ExecutionSubmitter::new(venue, config.order.magic, config.order.comment.clone()),
    )
  }

  /// Attach a metrics registry.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Attach an execution feedback sink.
  #[must_use]
  pub fn with_reporter(mut self, reporter: Arc<dyn OutcomeReporter>) -> Self {
    self.reporter = Some(reporter);
    self
  }

  /// Execution venue used by this pipeline.
  pub fn venue(&self) -> &Arc<V> {
    &self.venue
  }

  pub fn metrics(&self) -> Option<&Arc<MetricsRegistry>> {
    self.metrics.as_ref()
  }

  /// Run the four stages once.
  ///
  /// # Errors
  /// The first failing stage's error, wrapped in `CycleError`.
  pub async fn run_cycle(&self) -> Result<ExecutionResult, CycleError> {
    let signal = self.acquire().await?;
    Ok(self.execute(&signal).await?)
  }

  /// Fetch, parse and normalize.
  async fn acquire(&self) -> Result<TradeSignal, CycleError> {
    let payload = self.source.fetch().await?;
    debug!(status = payload.status, bytes = payload.body.len(), "Payload fetched");

    let signal = self.parser.parse(&payload.body)?;
    debug!(instrument = %signal.instrument, direction = %signal.direction, "Signal parsed");

    Ok(self.normalizer.normalize(signal).await?)
  }

  /// Submit, count, and report the venue's answer.
  async fn execute(&self, signal: &TradeSignal) -> Result<ExecutionResult, ExecutionError> {
    let submitted = self.submitter.submit(signal).await;

    if let Some(metrics) = &self.metrics {
      match &submitted {
        Ok(_) => metrics.observe_submission(signal.direction),
        Err(ExecutionError::Rejected(_)) => metrics.orders_rejected.inc(),
        Err(_) => {}
      }
    }

    let answered = match &submitted {
      Ok(result) | Err(ExecutionError::Rejected(result)) => Some(result),
      Err(_) => None,
    };
    if let (Some(reporter), Some(result)) = (&self.reporter, answered) {
      match reporter.report(OutcomeReport { signal, result }).await {
        Ok(()) => debug!("Outcome reported"),
        Err(e) => warn!(error = %e, "Outcome report failed"),
      }
    }

    submitted
  }

  /// Run one cycle and log its outcome on a single line. Never fails.
  #[instrument(skip(self), name = "cycle", fields(endpoint = %self.source.endpoint()))]
  pub async fn tick(&self) -> CycleOutcome {
    let started = Instant::now();

    let outcome = match self.acquire().await {
      Ok(signal) => match self.execute(&signal).await {
        Ok(result) => {
          info!(
            instrument = %signal.instrument,
            direction = %signal.direction,
            size = %signal.size,
            entry = %signal.entry_price,
            sl = %signal.stop_loss,
            tp = %signal.take_profit,
            receipt = result.receipt.as_deref().unwrap_or_default(),
            "Order placed"
          );
          CycleOutcome::Executed(result)
        }
        Err(e) => {
          error!(
            instrument = %signal.instrument,
            direction = %signal.direction,
            size = %signal.size,
            entry = %signal.entry_price,
            sl = %signal.stop_loss,
            tp = %signal.take_profit,
            reason = %e,
            "Order not placed"
          );
          CycleOutcome::Skipped(CycleError::Execution(e))
        }
      },
      Err(CycleError::Parse(ParseError::NoPendingSignal)) => {
        debug!("No pending signal");
        CycleOutcome::Idle
      }
      Err(e) => {
        warn!(stage = e.kind(), error = %e, "Cycle skipped");
        CycleOutcome::Skipped(e)
      }
    };

    if let Some(metrics) = &self.metrics {
      metrics.observe_cycle(outcome.label(), started.elapsed());
    }

    outcome
  }
}
