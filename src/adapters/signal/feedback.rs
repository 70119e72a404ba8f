//! HTTP Outcome Reporter - Execution Feedback POST
//!
//! Posts each `OutcomeReport` as JSON to the decision service's
//! feedback endpoint (`/ea` on the reference service). One request per
//! report with a bounded timeout; no retries.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::http::classify;
use crate::errors::TransportError;
use crate::ports::outcome::{OutcomeReport, OutcomeReporter};

/// Feedback endpoint client.
pub struct HttpOutcomeReporter {
    /// Underlying HTTP client (timeout baked in).
    http: Client,
    /// Feedback endpoint.
    url: String,
    /// Request timeout, kept for error reporting.
    timeout: Duration,
}

impl HttpOutcomeReporter {
    /// Create a reporter posting to `url` with the given request timeout.
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
}

#[async_trait]
impl OutcomeReporter for HttpOutcomeReporter {
    #[instrument(skip(self, report), fields(url = %self.url, accepted = report.result.accepted))]
    async fn report(&self, report: OutcomeReport<'_>) -> Result<(), TransportError> {
        let response = self
            .http
            .post(&self.url)
            .json(&report)
            .send()
            .await
            .map_err(|e| classify(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "Outcome reported");
        Ok(())
    }
}
