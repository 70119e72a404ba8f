//! Paper Venue - In-memory Simulated Execution
//!
//! Serves instrument metadata from config and accepts orders without
//! touching a real account. Stops are validated the way a terminal
//! would: for a buy, stop-loss below and take-profit above the entry;
//! mirrored for a sell. A zero stop means "none".

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::InstrumentConfig;
use crate::domain::trade::{Direction, InstrumentMetadata, OrderRequest, VolumeLimits};
use crate::errors::VenueError;
use crate::ports::venue::{ExecutionVenue, OrderAck};

/// Simulated venue backed by a static instrument table.
pub struct PaperVenue {
    /// Instruments keyed by symbol.
    instruments: HashMap<String, InstrumentConfig>,
    /// Accepted orders since startup.
    accepted: AtomicU64,
    /// Rejected orders since startup.
    rejected: AtomicU64,
}

impl PaperVenue {
    /// Create a paper venue offering the given instruments.
    pub fn new(instruments: Vec<InstrumentConfig>) -> Self {
        Self {
            instruments: instruments
                .into_iter()
                .map(|i| (i.symbol.clone(), i))
                .collect(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Orders accepted so far.
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Orders rejected so far.
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn lookup(&self, instrument: &str) -> Result<&InstrumentConfig, VenueError> {
        self.instruments
            .get(instrument)
            .ok_or_else(|| VenueError::UnknownInstrument(instrument.to_string()))
    }

    /// Why the terminal would refuse these stops, if it would.
    fn stop_violation(order: &OrderRequest) -> Option<&'static str> {
        let sl_set = order.stop_loss != Decimal::ZERO;
        let tp_set = order.take_profit != Decimal::ZERO;

        match order.direction {
            Direction::Buy => {
                if sl_set && order.stop_loss >= order.price {
                    return Some("Invalid stops: stop-loss must be below entry for a buy");
                }
                if tp_set && order.take_profit <= order.price {
                    return Some("Invalid stops: take-profit must be above entry for a buy");
                }
            }
            Direction::Sell => {
                if sl_set && order.stop_loss <= order.price {
                    return Some("Invalid stops: stop-loss must be above entry for a sell");
                }
                if tp_set && order.take_profit >= order.price {
                    return Some("Invalid stops: take-profit must be below entry for a sell");
                }
            }
        }
        None
    }

    fn reject(&self, reason: &str) -> OrderAck {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        OrderAck::rejected(reason)
    }
}

#[async_trait]
impl ExecutionVenue for PaperVenue {
    async fn instrument_precision(&self, instrument: &str) -> Result<u32, VenueError> {
        Ok(self.lookup(instrument)?.digits)
    }

    async fn volume_limits(&self, instrument: &str) -> Result<VolumeLimits, VenueError> {
        Ok(self.lookup(instrument)?.volume_limits())
    }

    async fn instrument_metadata(&self, instrument: &str) -> Result<InstrumentMetadata, VenueError> {
        let inst = self.lookup(instrument)?;
        Ok(InstrumentMetadata {
            digits: inst.digits,
            limits: inst.volume_limits(),
        })
    }

    #[instrument(skip(self, order), fields(instrument = %order.instrument, direction = %order.direction))]
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, VenueError> {
        if !self.instruments.contains_key(&order.instrument) {
            return Ok(self.reject("Unknown symbol"));
        }
        if order.size <= Decimal::ZERO {
            return Ok(self.reject("Invalid volume"));
        }
        if let Some(reason) = Self::stop_violation(order) {
            return Ok(self.reject(reason));
        }

        let receipt = format!("paper-{}", Uuid::new_v4());
        self.accepted.fetch_add(1, Ordering::Relaxed);
        debug!(receipt = %receipt, size = %order.size, price = %order.price, "Paper order filled");
        Ok(OrderAck::accepted(receipt))
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn venue() -> PaperVenue {
        PaperVenue::new(vec![InstrumentConfig {
            symbol: "EURUSD".to_string(),
            digits: 5,
            volume_min: dec!(0.01),
            volume_max: dec!(50),
            volume_step: dec!(0.01),
        }])
    }

    fn buy_order() -> OrderRequest {
        OrderRequest {
            direction: Direction::Buy,
            instrument: "EURUSD".to_string(),
            size: dec!(0.1),
            price: dec!(1.08450),
            stop_loss: dec!(1.08100),
            take_profit: dec!(1.09100),
            tag: 770_001,
            comment: "SimpleML_EA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_metadata_lookup() {
        let v = venue();
        assert_eq!(v.instrument_precision("EURUSD").await.unwrap(), 5);
        assert_eq!(v.volume_limits("EURUSD").await.unwrap().step, dec!(0.01));
        let meta = v.instrument_metadata("EURUSD").await.unwrap();
        assert_eq!(meta.digits, 5);
        assert_eq!(meta.limits.max, dec!(50));
        assert_eq!(
            v.instrument_precision("NOPE").await,
            Err(VenueError::UnknownInstrument("NOPE".to_string()))
        );
    }

    #[tokio::test]
    async fn test_valid_buy_is_accepted() {
        let v = venue();
        let ack = v.place_order(&buy_order()).await.unwrap();
        assert!(ack.accepted);
        assert!(ack.receipt.unwrap().starts_with("paper-"));
        assert_eq!(v.accepted_count(), 1);
    }

    #[tokio::test]
    async fn test_buy_with_inverted_stops_is_rejected() {
        let v = venue();
        let order = OrderRequest {
            stop_loss: dec!(1.09000),
            ..buy_order()
        };
        let ack = v.place_order(&order).await.unwrap();
        assert!(!ack.accepted);
        assert!(ack.reason.unwrap().starts_with("Invalid stops"));
        assert_eq!(v.rejected_count(), 1);
    }

    #[tokio::test]
    async fn test_sell_stops_mirror_buy() {
        let v = venue();
        let order = OrderRequest {
            direction: Direction::Sell,
            stop_loss: dec!(1.09100),
            take_profit: dec!(1.08100),
            ..buy_order()
        };
        assert!(v.place_order(&order).await.unwrap().accepted);
    }

    #[tokio::test]
    async fn test_zero_stops_mean_none() {
        let v = venue();
        let order = OrderRequest {
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            ..buy_order()
        };
        assert!(v.place_order(&order).await.unwrap().accepted);
    }
}
