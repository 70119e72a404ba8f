//! Configuration Module - TOML-based Bridge Configuration
//!
//! Loads and validates configuration from `config.toml` once at startup.
//! The endpoint, poll interval, venue connection and order tagging are
//! all externalized here; the core never mutates them.

pub mod loader;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::parser::ParseMode;
use crate::domain::trade::VolumeLimits;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  pub bot: BotConfig,
  /// Decision service endpoint and polling.
  pub signal: SignalConfig,
  /// Execution venue connection.
  pub venue: VenueConfig,
  /// Order tagging and size handling.
  #[serde(default)]
  pub order: OrderConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable name, logged at startup.
  pub name: String,
  /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of the human-readable format.
  #[serde(default = "default_true")]
  pub json_logs: bool,
}

/// Decision service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
  /// Full URL of the endpoint serving one instruction per call.
  pub url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_signal_timeout")]
  pub timeout_ms: u64,
  /// Poll interval in milliseconds.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_ms: u64,
  /// Payload scanning mode.
  #[serde(default)]
  pub parse_mode: ParseMode,
  /// Endpoint receiving one execution report per submitted order.
  #[serde(default)]
  pub feedback_url: Option<String>,
}

impl SignalConfig {
  pub const fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  pub const fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
}

/// Which venue adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
  /// REST bridge to a live trading terminal.
  Rest,
  /// In-memory simulated venue (no real orders).
  Paper,
}

/// Execution venue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
  /// Adapter selection.
  pub kind: VenueKind,
  /// REST bridge base URL (required for `rest`).
  pub base_url: Option<String>,
  /// REST request timeout in milliseconds.
  #[serde(default = "default_venue_timeout")]
  pub timeout_ms: u64,
  /// Name of the env var holding the bridge API key, if any.
  pub api_key_env: Option<String>,
  /// Instruments offered by the paper venue.
  #[serde(default)]
  pub instruments: Vec<InstrumentConfig>,
}

impl VenueConfig {
  pub const fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

/// Instrument metadata for the paper venue.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
  /// Symbol as served by the decision service.
  pub symbol: String,
  /// Price digits.
  pub digits: u32,
  /// Minimum lot size.
  pub volume_min: Decimal,
  /// Maximum lot size.
  pub volume_max: Decimal,
  /// Lot step.
  pub volume_step: Decimal,
}

impl InstrumentConfig {
  pub const fn volume_limits(&self) -> VolumeLimits {
    VolumeLimits {
      min: self.volume_min,
      max: self.volume_max,
      step: self.volume_step,
    }
  }
}

/// Order tagging and size handling.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
  /// Numeric marker attached to every order.
  #[serde(default = "default_magic")]
  pub magic: u64,
  /// Comment attached to every order.
  #[serde(default = "default_comment")]
  pub comment: String,
  /// Snap size to the venue lot step and enforce venue bounds.
  #[serde(default = "default_true")]
  pub snap_volume: bool,
}

impl Default for OrderConfig {
  fn default() -> Self {
    Self {
      magic: default_magic(),
      comment: default_comment(),
      snap_volume: true,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_true() -> bool {
  true
}

const fn default_signal_timeout() -> u64 {
  2_000
}

const fn default_poll_interval() -> u64 {
  1_000
}

const fn default_venue_timeout() -> u64 {
  5_000
}

const fn default_magic() -> u64 {
  770_001
}

fn default_comment() -> String {
  "SimpleML_EA".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

const fn default_health_port() -> u16 {
  8080
}
