//! REST Venue - Trading Terminal Bridge Client
//!
//! Implements the `ExecutionVenue` port against a small REST bridge
//! running next to the trading terminal:
//! - `GET  /ping` liveness
//! - `GET  /symbols/{symbol}` price digits and lot constraints
//! - `POST /orders` market order with stops
//!
//! Order placement is never retried here; a failed POST surfaces as a
//! `VenueError` and the cycle ends. Symbols are pushed as single
//! percent-encoded path segments, so broker suffixes such as `XAUUSD#`
//! reach the bridge intact.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, instrument, warn};

use super::types::{PlaceOrderBody, PlaceOrderResponse, SymbolInfoResponse};
use crate::config::VenueConfig;
use crate::domain::trade::{InstrumentMetadata, OrderRequest, VolumeLimits};
use crate::errors::VenueError;
use crate::ports::venue::{ExecutionVenue, OrderAck};

/// Header carrying the bridge API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// Configuration for the bridge client.
#[derive(Debug, Clone)]
pub struct RestVenueConfig {
  /// Bridge base URL, without trailing slash.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Optional API key.
  pub api_key: Option<String>,
}

impl Default for RestVenueConfig {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8000".to_string(),
      timeout: Duration::from_secs(5),
      api_key: None,
    }
  }
}

impl RestVenueConfig {
  /// Build from the `[venue]` section, reading the API key from the named env var.
  pub fn from_venue_config(config: &VenueConfig) -> Result<Self> {
    let base_url = config
      .base_url
      .clone()
      .context("venue.base_url is required for the rest venue")?;

    let api_key = match &config.api_key_env {
      Some(var) => Some(
        std::env::var(var).with_context(|| format!("Missing venue API key env var {var}"))?,
      ),
      None => None,
    };

    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      timeout: config.timeout(),
      api_key,
    })
  }
}

/// HTTP client for the terminal bridge.
pub struct RestVenue {
  /// Underlying HTTP client.
  http: Client,
  /// Parsed bridge base URL.
  base: Url,
  /// Client configuration.
  config: RestVenueConfig,
}

impl RestVenue {
  /// Create a new bridge client.
  pub fn new(config: RestVenueConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    let base = Url::parse(&config.base_url)
      .with_context(|| format!("Invalid venue base URL {:?}", config.base_url))?;
    anyhow::ensure!(
      !base.cannot_be_a_base(),
      "Venue base URL {:?} cannot carry a path",
      config.base_url
    );

    Ok(Self { http, base, config })
  }

  /// Base URL with `segments` appended, each one percent-encoded.
  fn url(&self, segments: &[&str]) -> Result<Url, VenueError> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|()| VenueError::Http(format!("base URL {} cannot carry a path", self.base)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.config.api_key {
      Some(key) => request.header(API_KEY_HEADER, key),
      None => request,
    }
  }

  async fn send(&self, request: RequestBuilder) -> Result<Response, VenueError> {
    self
      .authorize(request)
      .send()
      .await
      .map_err(|e| VenueError::Http(e.to_string()))
  }

  /// Turn a non-success response into an API error carrying its body.
  async fn api_error(response: Response) -> VenueError {
    let code = response.status().as_u16().to_string();
    let message = response.text().await.unwrap_or_default();
    VenueError::Api { code, message }
  }

  #[instrument(skip(self))]
  async fn symbol_info(&self, instrument: &str) -> Result<SymbolInfoResponse, VenueError> {
    let response = self
      .send(self.http.get(self.url(&["symbols", instrument])?))
      .await?;

    match response.status() {
      StatusCode::NOT_FOUND => Err(VenueError::UnknownInstrument(instrument.to_string())),
      status if status.is_success() => {
        let info: SymbolInfoResponse = response
          .json()
          .await
          .map_err(|e| VenueError::Decode(e.to_string()))?;
        debug!(instrument, digits = info.digits, "Symbol info fetched");
        Ok(info)
      }
      _ => Err(Self::api_error(response).await),
    }
  }
}

#[async_trait]
impl ExecutionVenue for RestVenue {
  async fn instrument_precision(&self, instrument: &str) -> Result<u32, VenueError> {
    Ok(self.symbol_info(instrument).await?.digits)
  }

  async fn volume_limits(&self, instrument: &str) -> Result<VolumeLimits, VenueError> {
    Ok(self.symbol_info(instrument).await?.volume_limits())
  }

  async fn instrument_metadata(&self, instrument: &str) -> Result<InstrumentMetadata, VenueError> {
    let info = self.symbol_info(instrument).await?;
    Ok(InstrumentMetadata {
      digits: info.digits,
      limits: info.volume_limits(),
    })
  }

  #[instrument(skip(self, order), fields(instrument = %order.instrument, direction = %order.direction, size = %order.size))]
  async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, VenueError> {
    let body = PlaceOrderBody::from(order);
    let response = self
      .send(self.http.post(self.url(&["orders"])?).json(&body))
      .await?;

    if !response.status().is_success() {
      return Err(Self::api_error(response).await);
    }

    let parsed: PlaceOrderResponse = response
      .json()
      .await
      .map_err(|e| VenueError::Decode(e.to_string()))?;

    if parsed.accepted {
      let receipt = parsed
        .ticket
        .as_ref()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
      debug!(receipt = %receipt, "Order accepted by terminal");
      Ok(OrderAck::accepted(receipt))
    } else {
      let reason = parsed.diagnostic();
      debug!(reason = %reason, "Order rejected by terminal");
      Ok(OrderAck::rejected(reason))
    }
  }

  async fn is_healthy(&self) -> bool {
    let url = match self.url(&["ping"]) {
      Ok(url) => url,
      Err(e) => {
        warn!(error = %e, "Venue ping URL invalid");
        return false;
      }
    };
    match self.send(self.http.get(url)).await {
      Ok(response) => response.status().is_success(),
      Err(e) => {
        warn!(error = %e, "Venue ping failed");
        false
      }
    }
  }
}
