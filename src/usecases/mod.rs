//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! poll -> parse -> normalize -> execute loop.
//!
//! Use cases:
//! - `Normalizer`: venue price digits and lot step
//! - `ExecutionSubmitter`: one order per signal, no retry
//! - `SignalPipeline`: one full cycle with outcome logging
//! - `Poller`: fixed-interval single-flight driver

pub mod normalizer;
pub mod pipeline;
pub mod poller;
pub mod submitter;

pub use normalizer::Normalizer;
pub use pipeline::{CycleOutcome, SignalPipeline};
pub use poller::{Poller, PollerStats};
pub use submitter::ExecutionSubmitter;
