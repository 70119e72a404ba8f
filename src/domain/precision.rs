//! Price and lot-size rounding against venue instrument metadata.
//!
//! Prices use round-half-away-from-zero, the convention trading
//! terminals apply when normalizing a double to N digits. Sizes are
//! floored to the venue step so a snapped size never exceeds what the
//! decision service asked for.

use rust_decimal::{Decimal, RoundingStrategy};

use super::trade::VolumeLimits;
use crate::errors::NormalizeError;

/// Round `price` to `digits` decimal places.
pub fn round_price(price: Decimal, digits: u32) -> Decimal {
    price.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor `size` to a multiple of `limits.step` and check it against `[min, max]`.
///
/// A zero step disables snapping; bounds are still enforced.
///
/// # Errors
/// Returns `NormalizeError::VolumeOutOfBounds` if the snapped size falls
/// outside the venue bounds, or if the size is too large to snap at all.
pub fn snap_volume(size: Decimal, limits: &VolumeLimits) -> Result<Decimal, NormalizeError> {
    let out_of_bounds = |size| NormalizeError::VolumeOutOfBounds {
        size,
        min: limits.min,
        max: limits.max,
    };

    let snapped = if limits.step > Decimal::ZERO {
        size.checked_div(limits.step)
            .map(|steps| steps.floor())
            .and_then(|steps| steps.checked_mul(limits.step))
            .ok_or_else(|| out_of_bounds(size))?
            .normalize()
    } else {
        size
    };

    if snapped < limits.min || snapped > limits.max || snapped <= Decimal::ZERO {
        return Err(out_of_bounds(snapped));
    }

    Ok(snapped)
}
