//! Core trading domain types.
//!
//! A `TradeSignal` lives for exactly one poll cycle: the parser creates
//! it, the normalizer rounds it, the submitter turns it into an
//! `OrderRequest` and the result is logged. Nothing here is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tradable symbol as the venue names it (e.g. `EURUSD`, `US30m`).
pub type InstrumentId = String;

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// One parsed trade instruction from the decision service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSignal {
    /// Instrument to trade, copied verbatim from the payload.
    pub instrument: InstrumentId,
    /// Requested entry price.
    pub entry_price: Decimal,
    /// Stop-loss price.
    pub stop_loss: Decimal,
    /// Take-profit price.
    pub take_profit: Decimal,
    /// Position size in lots.
    pub size: Decimal,
    /// Buy or sell.
    pub direction: Direction,
}

/// Lot size constraints published by the venue for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeLimits {
    /// Smallest accepted size.
    pub min: Decimal,
    /// Largest accepted size.
    pub max: Decimal,
    /// Sizes must be a whole multiple of this step.
    pub step: Decimal,
}

/// Everything the normalizer needs to know about one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    /// Price digits.
    pub digits: u32,
    /// Lot size constraints.
    pub limits: VolumeLimits,
}

/// Order handed to the execution venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub direction: Direction,
    pub instrument: InstrumentId,
    pub size: Decimal,
    pub price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Numeric marker identifying orders placed by this bridge.
    pub tag: u64,
    /// Free-text comment attached to the order.
    pub comment: String,
}

impl OrderRequest {
    /// Build the order for a normalized signal.
    pub fn from_signal(signal: &TradeSignal, tag: u64, comment: &str) -> Self {
        Self {
            direction: signal.direction,
            instrument: signal.instrument.clone(),
            size: signal.size,
            price: signal.entry_price,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            tag,
            comment: comment.to_string(),
        }
    }
}

/// Outcome of a single submission, accepted or not.
///
/// Kept only long enough to be logged and reported back to the
/// decision service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Whether the venue accepted the order.
    pub accepted: bool,
    /// Opaque venue receipt (ticket / order id) on acceptance.
    pub receipt: Option<String>,
    /// Venue diagnostic on rejection.
    pub reason: Option<String>,
    /// When the submission returned.
    pub submitted_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Order accepted with the given receipt.
    pub fn accepted(receipt: Option<String>) -> Self {
        Self {
            accepted: true,
            receipt,
            reason: None,
            submitted_at: Utc::now(),
        }
    }

    /// Order refused with the given diagnostic.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            receipt: None,
            reason: Some(reason.into()),
            submitted_at: Utc::now(),
        }
    }

    /// Rejection diagnostic, or a placeholder when the venue gave none.
    pub fn diagnostic(&self) -> &str {
        self.reason.as_deref().unwrap_or("no diagnostic")
    }
}
