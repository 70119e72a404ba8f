//! Error taxonomy for one poll cycle.
//!
//! Every stage has its own error type. `CycleError` wraps them at the
//! pipeline boundary, where each one becomes a logged, skipped cycle.
//! None of these are fatal to the process.

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::trade::ExecutionResult;

/// Failure fetching the payload from the decision service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Could not connect to the endpoint.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-success status.
    #[error("non-success status {0}")]
    Status(u16),

    /// Any other request or body read failure.
    #[error("request failed: {0}")]
    Request(String),
}

/// Failure extracting a trade signal from the payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("payload contains no object")]
    NoObject,

    /// The decision service has nothing queued.
    #[error("no pending signal")]
    NoPendingSignal,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The key was found but its value never terminates.
    #[error("value of `{0}` is not terminated")]
    UnterminatedValue(&'static str),

    #[error("empty value for `{0}`")]
    EmptyValue(&'static str),

    #[error("`{field}` is not a number: {raw:?}")]
    InvalidNumber {
        /// Field key.
        field: &'static str,
        /// Offending text.
        raw: String,
    },

    #[error("direction flag is neither true nor false: {0:?}")]
    InvalidDirection(String),

    #[error("field `{0}` appears more than once")]
    DuplicateField(&'static str),
}

/// Failure reported by the execution venue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VenueError {
    /// The venue does not know the instrument.
    #[error("unknown instrument {0}")]
    UnknownInstrument(String),

    /// Transport-level failure talking to the venue.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The venue answered with an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Status or return code.
        code: String,
        /// Venue message.
        message: String,
    },

    /// The venue response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Failure normalizing a signal against instrument metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The venue could not report digits (or lot limits) for the instrument.
    #[error("precision lookup failed: {0}")]
    PrecisionLookup(VenueError),

    #[error("size {size} outside venue bounds [{min}, {max}]")]
    VolumeOutOfBounds {
        /// Size after snapping to the venue step.
        size: Decimal,
        /// Venue minimum.
        min: Decimal,
        /// Venue maximum.
        max: Decimal,
    },
}

/// Failure submitting the order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// Size must be strictly positive; the venue is never called.
    #[error("position size must be positive, got {0}")]
    NonPositiveSize(Decimal),

    /// The venue refused the order; the result carries its diagnostic.
    #[error("order rejected: {}", .0.diagnostic())]
    Rejected(ExecutionResult),

    /// The submission call itself failed.
    #[error("venue error during submission: {0}")]
    Venue(VenueError),
}

/// Any reason a cycle ended without a placed order.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("normalize: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),
}

impl CycleError {
    /// Short label used for metrics and log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Normalize(NormalizeError::PrecisionLookup(_)) => "precision_lookup",
            Self::Normalize(_) => "volume",
            Self::Execution(_) => "execution",
        }
    }
}
