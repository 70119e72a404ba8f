//! HTTP Signal Source - Decision Service Poller Transport
//!
//! One GET per call against a fixed URL with a bounded timeout.
//! No retries: a failed fetch ends the cycle and the next tick tries
//! again.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::TransportError;
use crate::ports::signal_source::{SignalPayload, SignalSource};

/// Decision service client.
pub struct HttpSignalSource {
    /// Underlying HTTP client (timeout baked in).
    http: Client,
    /// Fixed endpoint.
    url: String,
    /// Request timeout, kept for error reporting.
    timeout: Duration,
}

impl HttpSignalSource {
    /// Create a client for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(1)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        classify(err, self.timeout)
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(super) fn classify(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl SignalSource for HttpSignalSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<SignalPayload, TransportError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(&e))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Signal payload fetched");

        Ok(SignalPayload {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
