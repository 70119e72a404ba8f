//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `SignalSource`: Fetching raw instructions from the decision service
//! - `ExecutionVenue`: Instrument metadata and order placement
//! - `OutcomeReporter`: Execution feedback to the decision service

pub mod outcome;
pub mod signal_source;
pub mod venue;
