//! Signal Normalizer - Venue Precision and Lot Rules
//!
//! Rounds the three prices of a signal to the instrument's digits and,
//! when enabled, snaps the size to the venue lot step. Metadata is
//! fetched from the venue on every call; nothing is cached across
//! cycles.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::precision::{round_price, snap_volume};
use crate::domain::trade::TradeSignal;
use crate::errors::NormalizeError;
use crate::ports::venue::ExecutionVenue;

/// Applies venue rounding rules to parsed signals.
pub struct Normalizer<V: ExecutionVenue> {
  /// Venue supplying instrument metadata.
  venue: Arc<V>,
  /// Whether to snap sizes to the venue lot step.
  snap_volume: bool,
}

impl<V: ExecutionVenue> Normalizer<V> {
  /// Create a new normalizer.
  pub const fn new(venue: Arc<V>, snap_volume: bool) -> Self {
    Self { venue, snap_volume }
  }

  /// Round prices (and optionally snap size) for `signal`.
  ///
  /// Direction and instrument pass through untouched. Rounding is
  /// idempotent: normalizing an already normalized signal returns it
  /// unchanged. With snapping on, digits and lot limits come from a
  /// single metadata lookup.
  ///
  /// # Errors
  /// `PrecisionLookup` if the venue cannot describe the instrument;
  /// `VolumeOutOfBounds` if the snapped size falls outside the venue
  /// limits.
  #[instrument(skip(self, signal), fields(instrument = %signal.instrument))]
  pub async fn normalize(&self, signal: TradeSignal) -> Result<TradeSignal, NormalizeError> {
    let (digits, size) = if self.snap_volume {
      let meta = self
        .venue
        .instrument_metadata(&signal.instrument)
        .await
        .map_err(NormalizeError::PrecisionLookup)?;
      (meta.digits, snap_volume(signal.size, &meta.limits)?)
    } else {
      let digits = self
        .venue
        .instrument_precision(&signal.instrument)
        .await
        .map_err(NormalizeError::PrecisionLookup)?;
      (digits, signal.size)
    };

    let normalized = TradeSignal {
      entry_price: round_price(signal.entry_price, digits),
      stop_loss: round_price(signal.stop_loss, digits),
      take_profit: round_price(signal.take_profit, digits),
      size,
      ..signal
    };

    debug!(
      digits,
      entry = %normalized.entry_price,
      sl = %normalized.stop_loss,
      tp = %normalized.take_profit,
      size = %normalized.size,
      "Signal normalized"
    );

    Ok(normalized)
  }
}
