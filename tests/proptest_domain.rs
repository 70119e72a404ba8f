//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify the rounding and lot-snapping rules across
//! random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use signal_bridge::domain::precision::{round_price, snap_volume};
use signal_bridge::domain::trade::VolumeLimits;

fn price() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000, 0u32..8).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

// ── Price Rounding Properties ───────────────────────────────

proptest! {
    /// Rounding an already rounded price changes nothing.
    #[test]
    fn round_price_is_idempotent(p in price(), digits in 0u32..6) {
        let once = round_price(p, digits);
        prop_assert_eq!(round_price(once, digits), once);
    }

    /// A rounded price never moves by more than half a unit of the last digit.
    #[test]
    fn round_price_stays_within_half_unit(p in price(), digits in 0u32..6) {
        let rounded = round_price(p, digits);
        let half_unit = Decimal::new(5, digits + 1);
        prop_assert!((rounded - p).abs() <= half_unit, "{p} -> {rounded}");
        prop_assert!(rounded.scale() <= digits);
    }
}

// ── Volume Snapping Properties ──────────────────────────────

proptest! {
    /// A snapped size never exceeds the requested size, is a whole
    /// number of steps, and lies within the venue bounds.
    #[test]
    fn snap_volume_floors_to_step_within_bounds(
        hundredths in 1i64..20_000,
        step_hundredths in prop::sample::select(vec![1i64, 5, 10, 100]),
    ) {
        let size = Decimal::new(hundredths, 2);
        let limits = VolumeLimits {
            min: dec!(0.01),
            max: dec!(100),
            step: Decimal::new(step_hundredths, 2),
        };

        match snap_volume(size, &limits) {
            Ok(snapped) => {
                prop_assert!(snapped <= size);
                prop_assert_eq!(snapped % limits.step, Decimal::ZERO);
                prop_assert!(snapped >= limits.min && snapped <= limits.max);
            }
            Err(_) => {
                let floored = (size / limits.step).floor() * limits.step;
                prop_assert!(floored < limits.min || floored > limits.max);
            }
        }
    }
}
