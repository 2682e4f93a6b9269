//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal`; values are converted to `f64`
//! (rounded to cents) only for storage and serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// (unit price + Σ extras) × quantity
pub fn line_total(unit_price: f64, extras: impl IntoIterator<Item = f64>, quantity: i32) -> Decimal {
    let per_unit = extras
        .into_iter()
        .fold(to_decimal(unit_price), |acc, extra| acc + to_decimal(extra));
    per_unit * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_drift_is_removed() {
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(-1005, 3)), -1.01);
    }

    #[test]
    fn test_line_total() {
        // 2 × (3.40 + 0.50 + 0.25)
        assert_eq!(to_f64(line_total(3.40, [0.50, 0.25], 2)), 8.30);
        assert_eq!(to_f64(line_total(12.0, [], 1)), 12.0);
    }
}
