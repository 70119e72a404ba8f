//! Execution Venue Port - Order Placement and Instrument Metadata
//!
//! Defines the capability the normalizer and submitter need from the
//! execution venue. The venue is passed in explicitly as an `Arc<V>`;
//! there is no global session. Adapters: REST bridge to a live
//! terminal, and an in-memory paper venue.

use async_trait::async_trait;

use crate::domain::trade::{InstrumentMetadata, OrderRequest, VolumeLimits};
use crate::errors::VenueError;

/// Venue answer to a single order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
  /// Whether the order was accepted.
  pub accepted: bool,
  /// Opaque receipt (ticket / order id) if accepted.
  pub receipt: Option<String>,
  /// Rejection diagnostic if not accepted.
  pub reason: Option<String>,
}

impl OrderAck {
  /// Accepted order with the given receipt.
  pub fn accepted(receipt: impl Into<String>) -> Self {
    Self {
      accepted: true,
      receipt: Some(receipt.into()),
      reason: None,
    }
  }

  /// Rejected order with the given diagnostic.
  pub fn rejected(reason: impl Into<String>) -> Self {
    Self {
      accepted: false,
      receipt: None,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for execution venues.
///
/// Calls are synchronous from the pipeline's point of view: each one is
/// awaited to completion before the cycle moves on.
#[async_trait]
pub trait ExecutionVenue: Send + Sync + 'static {
  /// Number of decimal places the venue accepts for prices of `instrument`.
  ///
  /// # Errors
  /// `VenueError::UnknownInstrument` if the venue does not list it.
  async fn instrument_precision(&self, instrument: &str) -> Result<u32, VenueError>;

  /// Lot size constraints for `instrument`.
  async fn volume_limits(&self, instrument: &str) -> Result<VolumeLimits, VenueError>;

  /// Digits and lot constraints together.
  ///
  /// Venues that serve both from one document should override this so a
  /// cycle costs one lookup.
  async fn instrument_metadata(&self, instrument: &str) -> Result<InstrumentMetadata, VenueError> {
    Ok(InstrumentMetadata {
      digits: self.instrument_precision(instrument).await?,
      limits: self.volume_limits(instrument).await?,
    })
  }

  /// Submit one order. Never retried by the caller.
  async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, VenueError>;

  /// Check if the venue connection is usable.
  async fn is_healthy(&self) -> bool;
}
