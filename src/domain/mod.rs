//! Domain layer - Core business logic and models.
//!
//! Pure logic with no I/O: signal types, the payload parser, and the
//! rounding rules applied before an order reaches the venue.

pub mod parser;
pub mod precision;
pub mod trade;

pub use parser::{ParseMode, SignalParser};
pub use trade::{
    Direction, ExecutionResult, InstrumentId, InstrumentMetadata, OrderRequest, TradeSignal,
    VolumeLimits,
};
