//! Signal Source Port - Decision Service Transport
//!
//! Defines the trait for fetching one raw payload from the decision
//! service. Adapters perform exactly one bounded request per call and
//! never retry; the next poll tick is the only retry mechanism.

use async_trait::async_trait;

use crate::errors::TransportError;

/// Raw response from the decision service.
///
/// Headers are dropped at the adapter; nothing downstream reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPayload {
  /// HTTP status code (always a success code when returned as `Ok`).
  pub status: u16,
  /// Response body, untouched.
  pub body: Vec<u8>,
}

/// Trait for decision-service transports.
#[async_trait]
pub trait SignalSource: Send + Sync + 'static {
  /// Fetch the currently served instruction.
  ///
  /// # Errors
  /// Returns `TransportError` on timeout, connection failure, or any
  /// non-success status. No partial payload is ever returned.
  async fn fetch(&self) -> Result<SignalPayload, TransportError>;

  /// Endpoint description for logs.
  fn endpoint(&self) -> &str;
}
