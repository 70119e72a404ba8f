//! Decision Service Adapters
//!
//! Sub-modules:
//! - `http`: reqwest-backed `SignalSource` with a bounded timeout
//! - `feedback`: reqwest-backed `OutcomeReporter` for execution feedback

pub mod feedback;
pub mod http;

pub use feedback::HttpOutcomeReporter;
pub use http::HttpSignalSource;
