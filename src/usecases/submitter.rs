//! Execution Submitter - One Order per Signal
//!
//! Turns a normalized signal into an `OrderRequest` and hands it to the
//! venue exactly once. There is no retry: a refused or failed order
//! ends the cycle and the next poll starts fresh.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::trade::{ExecutionResult, OrderRequest, TradeSignal};
use crate::errors::ExecutionError;
use crate::ports::venue::ExecutionVenue;

/// Places orders on the venue.
pub struct ExecutionSubmitter<V: ExecutionVenue> {
  /// Execution venue.
  venue: Arc<V>,
  /// Marker attached to every order (magic number).
  tag: u64,
  /// Comment attached to every order.
  comment: String,
}

impl<V: ExecutionVenue> ExecutionSubmitter<V> {
  /// Create a new submitter.
  pub fn new(venue: Arc<V>, tag: u64, comment: impl Into<String>) -> Self {
    Self {
      venue,
      tag,
      comment: comment.into(),
    }
  }

  /// Submit `signal` as a market order with its stops.
  ///
  /// Every venue answer becomes an `ExecutionResult`; a refusal is
  /// returned inside `ExecutionError::Rejected` so callers can still
  /// log and report it.
  ///
  /// # Errors
  /// - `NonPositiveSize` before any venue call if `size <= 0`
  /// - `Venue` if the submission call fails
  /// - `Rejected` if the venue refuses the order
  #[instrument(
    skip(self, signal),
    fields(instrument = %signal.instrument, direction = %signal.direction, size = %signal.size)
  )]
  pub async fn submit(&self, signal: &TradeSignal) -> Result<ExecutionResult, ExecutionError> {
    if signal.size <= Decimal::ZERO {
      return Err(ExecutionError::NonPositiveSize(signal.size));
    }

    let order = OrderRequest::from_signal(signal, self.tag, &self.comment);
    let ack = self
      .venue
      .place_order(&order)
      .await
      .map_err(ExecutionError::Venue)?;

    let result = if ack.accepted {
      ExecutionResult::accepted(ack.receipt)
    } else {
      ExecutionResult::rejected(
        ack
          .reason
          .unwrap_or_else(|| "rejected without diagnostic".to_string()),
      )
    };
    debug!(accepted = result.accepted, receipt = ?result.receipt, reason = ?result.reason, "Venue answered");

    if result.accepted {
      Ok(result)
    } else {
      Err(ExecutionError::Rejected(result))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::venue::PaperVenue;
  use crate::config::InstrumentConfig;
  use crate::domain::trade::Direction;
  use rust_decimal_macros::dec;

  fn venue() -> Arc<PaperVenue> {
    Arc::new(PaperVenue::new(vec![InstrumentConfig {
      symbol: "US30m".to_string(),
      digits: 2,
      volume_min: dec!(0.01),
      volume_max: dec!(100),
      volume_step: dec!(0.01),
    }]))
  }

  fn signal() -> TradeSignal {
    TradeSignal {
      instrument: "US30m".to_string(),
      entry_price: dec!(35000),
      stop_loss: dec!(34900),
      take_profit: dec!(35100),
      size: dec!(0.1),
      direction: Direction::Buy,
    }
  }

  #[tokio::test]
  async fn test_accepted_order_returns_receipt() {
    let v = venue();
    let s = ExecutionSubmitter::new(Arc::clone(&v), 770_001, "SimpleML_EA");
    let result = s.submit(&signal()).await.unwrap();
    assert!(result.accepted);
    assert!(result.receipt.is_some());
    assert_eq!(v.accepted_count(), 1);
  }

  #[tokio::test]
  async fn test_zero_size_never_reaches_venue() {
    let v = venue();
    let s = ExecutionSubmitter::new(Arc::clone(&v), 770_001, "SimpleML_EA");
    let err = s
      .submit(&TradeSignal {
        size: Decimal::ZERO,
        ..signal()
      })
      .await
      .unwrap_err();
    assert_eq!(err, ExecutionError::NonPositiveSize(Decimal::ZERO));
    assert_eq!(v.accepted_count() + v.rejected_count(), 0);
  }

  #[tokio::test]
  async fn test_refused_order_maps_to_rejected() {
    let v = venue();
    let s = ExecutionSubmitter::new(Arc::clone(&v), 770_001, "SimpleML_EA");
    let err = s
      .submit(&TradeSignal {
        stop_loss: dec!(35050),
        ..signal()
      })
      .await
      .unwrap_err();
    match err {
      ExecutionError::Rejected(result) => {
        assert!(!result.accepted);
        assert!(result.receipt.is_none());
        assert!(result.diagnostic().starts_with("Invalid stops"));
      }
      other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(v.rejected_count(), 1);
  }
}
