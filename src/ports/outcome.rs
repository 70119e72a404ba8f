//! Outcome Reporter Port - Execution Feedback to the Decision Service
//!
//! After every venue answer the bridge may tell the decision service
//! what happened to the signal it served. Reports are fire-once: one
//! bounded request, never retried, and a failure never affects the
//! cycle outcome.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::trade::{ExecutionResult, TradeSignal};
use crate::errors::TransportError;

/// One applied signal and what the venue made of it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutcomeReport<'a> {
  /// Signal as submitted, after normalization.
  #[serde(flatten)]
  pub signal: &'a TradeSignal,
  /// Venue answer.
  #[serde(flatten)]
  pub result: &'a ExecutionResult,
}

/// Trait for feedback sinks.
#[async_trait]
pub trait OutcomeReporter: Send + Sync + 'static {
  /// Deliver one report.
  ///
  /// # Errors
  /// `TransportError` on timeout, connection failure, or non-success status.
  async fn report(&self, report: OutcomeReport<'_>) -> Result<(), TransportError>;
}
