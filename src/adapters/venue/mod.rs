//! Execution Venue Adapters
//!
//! Sub-modules:
//! - `rest`: HTTP client for the trading terminal bridge
//! - `paper`: in-memory simulated venue for dry runs
//! - `types`: bridge request/response types

pub mod paper;
pub mod rest;
pub mod types;

pub use paper::PaperVenue;
pub use rest::{RestVenue, RestVenueConfig};
