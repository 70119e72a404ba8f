//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::{AppConfig, VenueKind};

/// Env var that overrides the config file path.
pub const CONFIG_PATH_ENV: &str = "SIGNAL_BRIDGE_CONFIG";

/// Terminals truncate order comments beyond this many characters.
const MAX_COMMENT_LEN: usize = 31;

/// Config path from `SIGNAL_BRIDGE_CONFIG`, falling back to `config.toml`.
pub fn config_path() -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    url = %config.signal.url,
    interval_ms = config.signal.poll_interval_ms,
    venue = ?config.venue.kind,
    parse_mode = ?config.signal.parse_mode,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Signal endpoint
  anyhow::ensure!(
    config.signal.url.starts_with("http://") || config.signal.url.starts_with("https://"),
    "signal.url must be an http(s) URL, got {:?}",
    config.signal.url
  );
  anyhow::ensure!(
    config.signal.timeout_ms > 0,
    "signal.timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.signal.poll_interval_ms > 0,
    "signal.poll_interval_ms must be positive"
  );
  if let Some(feedback_url) = &config.signal.feedback_url {
    anyhow::ensure!(
      feedback_url.starts_with("http://") || feedback_url.starts_with("https://"),
      "signal.feedback_url must be an http(s) URL, got {feedback_url:?}"
    );
  }

  // Venue
  match config.venue.kind {
    VenueKind::Rest => {
      let base_url = config.venue.base_url.as_deref().unwrap_or_default();
      anyhow::ensure!(
        !base_url.is_empty(),
        "venue.base_url is required for the rest venue"
      );
    }
    VenueKind::Paper => {
      anyhow::ensure!(
        !config.venue.instruments.is_empty(),
        "paper venue needs at least one [[venue.instruments]] entry"
      );
    }
  }
  anyhow::ensure!(config.venue.timeout_ms > 0, "venue.timeout_ms must be positive");

  for (i, inst) in config.venue.instruments.iter().enumerate() {
    anyhow::ensure!(
      !inst.symbol.is_empty(),
      "Instrument {} has empty symbol",
      i
    );
    anyhow::ensure!(
      inst.volume_min > Decimal::ZERO && inst.volume_max >= inst.volume_min,
      "Instrument {} ({}) needs 0 < volume_min <= volume_max",
      i,
      inst.symbol
    );
    anyhow::ensure!(
      inst.volume_step >= Decimal::ZERO,
      "Instrument {} ({}) has negative volume_step",
      i,
      inst.symbol
    );
  }

  // Order tagging
  anyhow::ensure!(
    config.order.comment.chars().count() <= MAX_COMMENT_LEN,
    "order.comment must be at most {} characters",
    MAX_COMMENT_LEN
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::parser::ParseMode;
  use rust_decimal_macros::dec;

  const PAPER_CONFIG: &str = r#"
[bot]
name = "bridge-test"

[signal]
url = "http://127.0.0.1:5000/trade_signal"

[venue]
kind = "paper"

[[venue.instruments]]
symbol = "EURUSD"
digits = 5
volume_min = "0.01"
volume_max = "100"
volume_step = "0.01"
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_defaults_applied() {
    let config = parse_config(PAPER_CONFIG).unwrap();
    assert_eq!(config.bot.log_level, "info");
    assert!(config.bot.json_logs);
    assert_eq!(config.signal.timeout_ms, 2_000);
    assert_eq!(config.signal.poll_interval_ms, 1_000);
    assert_eq!(config.signal.parse_mode, ParseMode::Strict);
    assert!(config.signal.feedback_url.is_none());
    assert_eq!(config.venue.kind, VenueKind::Paper);
    assert_eq!(config.order.magic, 770_001);
    assert_eq!(config.order.comment, "SimpleML_EA");
    assert!(config.order.snap_volume);
    assert!(config.metrics.enabled);
    assert_eq!(config.venue.instruments[0].volume_step, dec!(0.01));
  }

  #[test]
  fn test_rest_venue_requires_base_url() {
    let text = r#"
[bot]
name = "bridge-test"

[signal]
url = "http://127.0.0.1:5000/trade_signal"

[venue]
kind = "rest"
"#;
    let err = parse_config(text).unwrap_err();
    assert!(err.to_string().contains("base_url"));
  }

  #[test]
  fn test_rejects_non_http_url() {
    let text = PAPER_CONFIG.replace("http://127.0.0.1:5000/trade_signal", "ftp://host/x");
    assert!(parse_config(&text).is_err());
  }

  #[test]
  fn test_rejects_long_comment() {
    let text = format!(
      "{PAPER_CONFIG}\n[order]\ncomment = \"{}\"\n",
      "x".repeat(40)
    );
    assert!(parse_config(&text).is_err());
  }

  #[test]
  fn test_legacy_mode_and_overrides() {
    let text = PAPER_CONFIG.replace(
      "url = \"http://127.0.0.1:5000/trade_signal\"",
      "url = \"http://127.0.0.1:5000/trade_signal\"\nparse_mode = \"legacy\"\npoll_interval_ms = 250",
    );
    let config = parse_config(&text).unwrap();
    assert_eq!(config.signal.parse_mode, ParseMode::Legacy);
    assert_eq!(config.signal.poll_interval().as_millis(), 250);
  }

  #[test]
  fn test_feedback_url_is_optional_but_validated() {
    let with_feedback = PAPER_CONFIG.replace(
      "url = \"http://127.0.0.1:5000/trade_signal\"",
      "url = \"http://127.0.0.1:5000/trade_signal\"\nfeedback_url = \"http://127.0.0.1:5000/ea\"",
    );
    let config = parse_config(&with_feedback).unwrap();
    assert_eq!(config.signal.feedback_url.as_deref(), Some("http://127.0.0.1:5000/ea"));

    let bad = with_feedback.replace("http://127.0.0.1:5000/ea", "udp://127.0.0.1:5000/ea");
    let err = parse_config(&bad).unwrap_err();
    assert!(err.to_string().contains("feedback_url"));
  }
}
