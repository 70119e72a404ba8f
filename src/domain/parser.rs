//! Signal parser: raw decision-service payload to `TradeSignal`.
//!
//! The payload is treated as untrusted text that only loosely resembles
//! a JSON object. Six keys are recognized, in this logical order:
//! `instrument`, `entry_price`, `sl_price`, `tp_price`, `lot_size`,
//! `is_buy`. Any missing or unreadable field fails the whole parse.
//!
//! Two scanning modes exist:
//! - `Legacy` walks the keys in declared order, each search starting
//!   where the previous value ended. A payload with the keys in any other
//!   order fails. The direction flag is Buy only if its raw text contains
//!   `true`; everything else, including `TRUE` and an empty value, is Sell.
//! - `Strict` indexes every key independent of position, rejects
//!   duplicated keys, and parses the direction flag three ways
//!   (`true` / `false` / invalid).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::trade::{Direction, TradeSignal};
use crate::errors::ParseError;

/// How the payload is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Ordered scan with degrade-to-sell on the direction flag.
    Legacy,
    /// Order-independent scan with a three-way direction flag.
    #[default]
    Strict,
}

/// The six recognized fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Instrument,
    EntryPrice,
    StopLoss,
    TakeProfit,
    Size,
    Direction,
}

impl Field {
    /// Declared order. `Legacy` mode requires the payload to follow it.
    const ALL: [Self; 6] = [
        Self::Instrument,
        Self::EntryPrice,
        Self::StopLoss,
        Self::TakeProfit,
        Self::Size,
        Self::Direction,
    ];

    const fn key(self) -> &'static str {
        match self {
            Self::Instrument => "instrument",
            Self::EntryPrice => "entry_price",
            Self::StopLoss => "sl_price",
            Self::TakeProfit => "tp_price",
            Self::Size => "lot_size",
            Self::Direction => "is_buy",
        }
    }
}

/// Key the decision service uses to report an empty queue.
const STATUS_KEY: &str = "status";
const EMPTY_STATUS: &str = "empty";

/// Stateless parser; one instance is reused across cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalParser {
    mode: ParseMode,
}

impl SignalParser {
    pub const fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub const fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Extract a trade signal from raw payload bytes.
    ///
    /// # Errors
    /// Returns `ParseError` if the payload is not UTF-8, has no object,
    /// reports an empty queue, or any field is missing or malformed.
    pub fn parse(&self, payload: &[u8]) -> Result<TradeSignal, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::NotUtf8)?;
        let start = text.find('{').ok_or(ParseError::NoObject)?;

        if reports_empty_queue(text, start) {
            return Err(ParseError::NoPendingSignal);
        }

        let raw = match self.mode {
            ParseMode::Legacy => scan_ordered(text, start)?,
            ParseMode::Strict => scan_indexed(text, start)?,
        };

        build_signal(&raw, self.mode)
    }
}

/// Offset just past the `:` that follows `"key"`, searching from `from`.
///
/// A quoted key not followed by a colon (i.e. the same text used as a
/// value) is skipped.
fn find_key(text: &str, key: &str, from: usize) -> Option<usize> {
    let needle = format!("\"{key}\"");
    let mut cursor = from;

    loop {
        let rel = text.get(cursor..)?.find(&needle)?;
        let after = cursor + rel + needle.len();
        let rest = text[after..].trim_start();
        if let Some(value) = rest.strip_prefix(':') {
            return Some(text.len() - value.len());
        }
        cursor = after;
    }
}

/// Text between `from` and the next `,` or `}`.
fn delimited_value(text: &str, from: usize) -> Option<(&str, usize)> {
    let end = from + text[from..].find(|c: char| c == ',' || c == '}')?;
    Some((&text[from..end], end))
}

/// Quoted strings run to their closing quote; anything else is delimited.
fn isolate_value(text: &str, from: usize) -> Option<(&str, usize)> {
    let rest = &text[from..];
    let trimmed = rest.trim_start();
    let offset = from + (rest.len() - trimmed.len());

    if let Some(body) = trimmed.strip_prefix('"') {
        let close = body.find('"')?;
        let value_start = offset + 1;
        return Some((&text[value_start..value_start + close], value_start + close + 1));
    }

    delimited_value(text, offset)
}

fn reports_empty_queue(text: &str, start: usize) -> bool {
    find_key(text, STATUS_KEY, start)
        .and_then(|at| isolate_value(text, at))
        .is_some_and(|(value, _)| value.trim() == EMPTY_STATUS)
}

fn scan_ordered(text: &str, start: usize) -> Result<[&str; 6], ParseError> {
    let mut raw = [""; 6];
    let mut cursor = start;

    for (slot, field) in raw.iter_mut().zip(Field::ALL) {
        let value_start =
            find_key(text, field.key(), cursor).ok_or(ParseError::MissingField(field.key()))?;
        let (value, value_end) = delimited_value(text, value_start)
            .ok_or(ParseError::UnterminatedValue(field.key()))?;
        *slot = value;
        cursor = value_end;
    }

    Ok(raw)
}

fn scan_indexed(text: &str, start: usize) -> Result<[&str; 6], ParseError> {
    let mut raw = [""; 6];

    for (slot, field) in raw.iter_mut().zip(Field::ALL) {
        let value_start =
            find_key(text, field.key(), start).ok_or(ParseError::MissingField(field.key()))?;
        let (value, value_end) = isolate_value(text, value_start)
            .ok_or(ParseError::UnterminatedValue(field.key()))?;
        if find_key(text, field.key(), value_end).is_some() {
            return Err(ParseError::DuplicateField(field.key()));
        }
        *slot = value;
    }

    Ok(raw)
}

fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

fn parse_decimal(field: Field, raw: &str) -> Result<Decimal, ParseError> {
    let text = unquote(raw);
    if text.is_empty() {
        return Err(ParseError::EmptyValue(field.key()));
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| ParseError::InvalidNumber {
            field: field.key(),
            raw: text.to_string(),
        })
}

fn parse_direction(raw: &str, mode: ParseMode) -> Result<Direction, ParseError> {
    match mode {
        ParseMode::Legacy => Ok(if raw.contains("true") {
            Direction::Buy
        } else {
            Direction::Sell
        }),
        ParseMode::Strict => match unquote(raw) {
            "true" => Ok(Direction::Buy),
            "false" => Ok(Direction::Sell),
            other => Err(ParseError::InvalidDirection(other.to_string())),
        },
    }
}

fn build_signal(raw: &[&str; 6], mode: ParseMode) -> Result<TradeSignal, ParseError> {
    let instrument = unquote(raw[0]);
    if instrument.is_empty() {
        return Err(ParseError::EmptyValue(Field::Instrument.key()));
    }

    Ok(TradeSignal {
        instrument: instrument.to_string(),
        entry_price: parse_decimal(Field::EntryPrice, raw[1])?,
        stop_loss: parse_decimal(Field::StopLoss, raw[2])?,
        take_profit: parse_decimal(Field::TakeProfit, raw[3])?,
        size: parse_decimal(Field::Size, raw[4])?,
        direction: parse_direction(raw[5], mode)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LEGACY: SignalParser = SignalParser::new(ParseMode::Legacy);
    const STRICT: SignalParser = SignalParser::new(ParseMode::Strict);

    fn known_signal() -> TradeSignal {
        TradeSignal {
            instrument: "EURUSD".to_string(),
            entry_price: dec!(1.08452),
            stop_loss: dec!(1.08101),
            take_profit: dec!(1.09120),
            size: dec!(0.25),
            direction: Direction::Buy,
        }
    }

    /// Serialize a signal the way the decision service does, keys in declared order.
    fn payload_for(signal: &TradeSignal) -> String {
        format!(
            r#"{{"status": "ok", "signal": {{"instrument": "{}", "entry_price": {}, "sl_price": {}, "tp_price": {}, "lot_size": {}, "is_buy": {}, "confidence": 0.95}}}}"#,
            signal.instrument,
            signal.entry_price,
            signal.stop_loss,
            signal.take_profit,
            signal.size,
            signal.direction == Direction::Buy,
        )
    }

    fn payload_with_flag(flag: &str) -> String {
        format!(
            r#"{{"instrument":"US30m","entry_price":35000,"sl_price":34900,"tp_price":35100,"lot_size":0.1,"is_buy":{flag}}}"#
        )
    }

    #[test]
    fn test_round_trip_both_modes() {
        let signal = known_signal();
        let payload = payload_for(&signal);
        assert_eq!(LEGACY.parse(payload.as_bytes()).unwrap(), signal);
        assert_eq!(STRICT.parse(payload.as_bytes()).unwrap(), signal);

        let sell = TradeSignal {
            direction: Direction::Sell,
            ..known_signal()
        };
        let payload = payload_for(&sell);
        assert_eq!(LEGACY.parse(payload.as_bytes()).unwrap(), sell);
        assert_eq!(STRICT.parse(payload.as_bytes()).unwrap(), sell);
    }

    #[test]
    fn test_missing_any_field_fails() {
        let full = payload_for(&known_signal());
        for field in Field::ALL {
            let key = format!("\"{}\"", field.key());
            let broken = full.replace(&key, "\"renamed\"");
            for parser in [LEGACY, STRICT] {
                assert_eq!(
                    parser.parse(broken.as_bytes()),
                    Err(ParseError::MissingField(field.key())),
                    "mode {:?}, field {}",
                    parser.mode(),
                    field.key()
                );
            }
        }
    }

    #[test]
    fn test_legacy_rejects_out_of_order_payload() {
        // Keys sorted alphabetically, as a JSON encoder with sort_keys emits them.
        let payload = r#"{"entry_price": 35000, "instrument": "US30m", "is_buy": true, "lot_size": 0.1, "sl_price": 34900, "tp_price": 35100}"#;
        assert!(LEGACY.parse(payload.as_bytes()).is_err());

        let signal = STRICT.parse(payload.as_bytes()).unwrap();
        assert_eq!(signal.instrument, "US30m");
        assert_eq!(signal.size, dec!(0.1));
        assert_eq!(signal.direction, Direction::Buy);
    }

    #[test]
    fn test_legacy_direction_false_is_sell() {
        let signal = LEGACY.parse(payload_with_flag("false").as_bytes()).unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn test_legacy_direction_uppercase_true_degrades_to_sell() {
        // Known hazard: a case mismatch silently flips the trade direction.
        let signal = LEGACY.parse(payload_with_flag("TRUE").as_bytes()).unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn test_legacy_direction_empty_value_degrades_to_sell() {
        let signal = LEGACY.parse(payload_with_flag("").as_bytes()).unwrap();
        assert_eq!(signal.direction, Direction::Sell);

        let signal = LEGACY.parse(payload_with_flag("garbage").as_bytes()).unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn test_strict_direction_is_three_way() {
        assert_eq!(
            STRICT.parse(payload_with_flag("true").as_bytes()).unwrap().direction,
            Direction::Buy
        );
        assert_eq!(
            STRICT.parse(payload_with_flag("false").as_bytes()).unwrap().direction,
            Direction::Sell
        );
        assert_eq!(
            STRICT.parse(payload_with_flag("TRUE").as_bytes()),
            Err(ParseError::InvalidDirection("TRUE".to_string()))
        );
        assert_eq!(
            STRICT.parse(payload_with_flag("").as_bytes()),
            Err(ParseError::InvalidDirection(String::new()))
        );
    }

    #[test]
    fn test_non_numeric_price_fails() {
        let payload = r#"{"instrument":"US30m","entry_price":"abc","sl_price":34900,"tp_price":35100,"lot_size":0.1,"is_buy":true}"#;
        for parser in [LEGACY, STRICT] {
            assert_eq!(
                parser.parse(payload.as_bytes()),
                Err(ParseError::InvalidNumber {
                    field: "entry_price",
                    raw: "abc".to_string()
                })
            );
        }
    }

    #[test]
    fn test_empty_size_fails() {
        let payload = r#"{"instrument":"US30m","entry_price":35000,"sl_price":34900,"tp_price":35100,"lot_size":,"is_buy":true}"#;
        for parser in [LEGACY, STRICT] {
            assert_eq!(
                parser.parse(payload.as_bytes()),
                Err(ParseError::EmptyValue("lot_size"))
            );
        }
    }

    #[test]
    fn test_scientific_notation_accepted() {
        let payload = r#"{"instrument":"BTCUSD","entry_price":6.5e4,"sl_price":64000,"tp_price":66000,"lot_size":1e-2,"is_buy":false}"#;
        let signal = STRICT.parse(payload.as_bytes()).unwrap();
        assert_eq!(signal.entry_price, dec!(65000));
        assert_eq!(signal.size, dec!(0.01));
    }

    #[test]
    fn test_no_object_fails() {
        assert_eq!(STRICT.parse(b"instrument=US30m"), Err(ParseError::NoObject));
        assert_eq!(LEGACY.parse(b""), Err(ParseError::NoObject));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        assert_eq!(STRICT.parse(&[0x7b, 0xff, 0xfe]), Err(ParseError::NotUtf8));
    }

    #[test]
    fn test_empty_queue_reported() {
        for parser in [LEGACY, STRICT] {
            assert_eq!(
                parser.parse(br#"{"status": "empty"}"#),
                Err(ParseError::NoPendingSignal)
            );
        }
    }

    #[test]
    fn test_strict_rejects_duplicate_key() {
        let payload = r#"{"instrument":"US30m","entry_price":35000,"sl_price":34900,"tp_price":35100,"lot_size":0.1,"is_buy":true,"lot_size":5}"#;
        assert_eq!(
            STRICT.parse(payload.as_bytes()),
            Err(ParseError::DuplicateField("lot_size"))
        );
    }

    #[test]
    fn test_unterminated_final_value_fails() {
        let payload = r#"{"instrument":"US30m","entry_price":35000,"sl_price":34900,"tp_price":35100,"lot_size":0.1,"is_buy":true"#;
        for parser in [LEGACY, STRICT] {
            assert_eq!(
                parser.parse(payload.as_bytes()),
                Err(ParseError::UnterminatedValue("is_buy"))
            );
        }
    }

    #[test]
    fn test_key_text_used_as_value_is_skipped() {
        let payload = r#"{"note":"instrument","instrument":"GBPUSD","entry_price":1.27,"sl_price":1.26,"tp_price":1.29,"lot_size":0.5,"is_buy":true}"#;
        let signal = STRICT.parse(payload.as_bytes()).unwrap();
        assert_eq!(signal.instrument, "GBPUSD");
    }

    #[test]
    fn test_strict_keeps_commas_inside_quoted_instrument() {
        let payload = r#"{"instrument":"DE40,cash","entry_price":18000,"sl_price":17900,"tp_price":18200,"lot_size":1,"is_buy":false}"#;
        let signal = STRICT.parse(payload.as_bytes()).unwrap();
        assert_eq!(signal.instrument, "DE40,cash");
    }

    #[test]
    fn test_parse_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ParseMode,
        }
        let w: Wrapper = toml::from_str(r#"mode = "legacy""#).unwrap();
        assert_eq!(w.mode, ParseMode::Legacy);
        assert_eq!(ParseMode::default(), ParseMode::Strict);
    }
}
