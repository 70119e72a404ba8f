//! Parser Benchmarks - Per-cycle Parse and Rounding Cost
//!
//! Benchmarks the pure work done on every poll cycle, in both parse
//! modes.
//!
//! Run with: cargo bench --bench parser_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use signal_bridge::domain::parser::{ParseMode, SignalParser};
use signal_bridge::domain::precision::{round_price, snap_volume};
use signal_bridge::domain::trade::VolumeLimits;

const PAYLOAD: &[u8] = br#"{"status": "ok", "signal": {"instrument": "US30m", "entry_price": 35000.456, "sl_price": 34900.123, "tp_price": 35100.789, "lot_size": 0.1, "is_buy": true, "confidence": 0.82, "session": "NY", "symbol": "US30m"}}"#;

/// Benchmark a full parse in each mode.
fn bench_parse(c: &mut Criterion) {
    for (name, mode) in [("parse_legacy", ParseMode::Legacy), ("parse_strict", ParseMode::Strict)] {
        let parser = SignalParser::new(mode);
        c.bench_function(name, |b| {
            b.iter(|| parser.parse(black_box(PAYLOAD)));
        });
    }
}

/// Benchmark the normalization arithmetic.
fn bench_rounding(c: &mut Criterion) {
    let limits = VolumeLimits {
        min: dec!(0.01),
        max: dec!(100),
        step: dec!(0.01),
    };

    c.bench_function("round_price_5dp", |b| {
        b.iter(|| round_price(black_box(dec!(1.0845263)), black_box(5)));
    });

    c.bench_function("snap_volume", |b| {
        b.iter(|| snap_volume(black_box(dec!(0.157)), &limits));
    });
}

criterion_group!(benches, bench_parse, bench_rounding);
criterion_main!(benches);
