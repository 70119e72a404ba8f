//! Venue Bridge Request/Response Types
//!
//! Wire types for the REST bridge that fronts the trading terminal.
//! Decimals travel as strings so no precision is lost in transit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::trade::{Direction, OrderRequest, VolumeLimits};

/// `GET /symbols/{symbol}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfoResponse {
  /// Price digits.
  pub digits: u32,
  /// Minimum lot size.
  pub volume_min: Decimal,
  /// Maximum lot size.
  pub volume_max: Decimal,
  /// Lot step.
  pub volume_step: Decimal,
}

impl SymbolInfoResponse {
  pub const fn volume_limits(&self) -> VolumeLimits {
    VolumeLimits {
      min: self.volume_min,
      max: self.volume_max,
      step: self.volume_step,
    }
  }
}

/// `POST /orders` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderBody<'a> {
  /// "BUY" or "SELL".
  pub action: Direction,
  pub symbol: &'a str,
  pub volume: Decimal,
  pub price: Decimal,
  pub sl: Decimal,
  pub tp: Decimal,
  pub magic: u64,
  pub comment: &'a str,
}

impl<'a> From<&'a OrderRequest> for PlaceOrderBody<'a> {
  fn from(order: &'a OrderRequest) -> Self {
    Self {
      action: order.direction,
      symbol: &order.instrument,
      volume: order.size,
      price: order.price,
      sl: order.stop_loss,
      tp: order.take_profit,
      magic: order.tag,
      comment: &order.comment,
    }
  }
}

/// Terminal tickets are numeric on some bridges and strings on others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Ticket {
  Number(u64),
  Text(String),
}

impl std::fmt::Display for Ticket {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{n}"),
      Self::Text(s) => write!(f, "{s}"),
    }
  }
}

/// `POST /orders` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderResponse {
  /// Whether the terminal accepted the order.
  pub accepted: bool,
  /// Order ticket when accepted.
  pub ticket: Option<Ticket>,
  /// Terminal return code.
  pub retcode: Option<u32>,
  /// Terminal diagnostic.
  pub comment: Option<String>,
}

impl PlaceOrderResponse {
  /// Rejection text combining the return code and comment.
  pub fn diagnostic(&self) -> String {
    match (&self.retcode, &self.comment) {
      (Some(code), Some(msg)) => format!("retcode {code}: {msg}"),
      (Some(code), None) => format!("retcode {code}"),
      (None, Some(msg)) => msg.clone(),
      (None, None) => "rejected without diagnostic".to_string(),
    }
  }
}
