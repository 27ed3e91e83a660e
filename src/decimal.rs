//! Decimal arithmetic primitive used for prices, quantities, and fees.
//!
//! The matching path never touches floating point: every monetary value in
//! this crate is a [`rust_decimal::Decimal`], which is an exact, fixed-scale
//! base-10 integer under the hood and therefore gives the same result on
//! every platform for the same inputs.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// A price or quantity. Both use the same underlying representation; the
/// distinction is purely in how a field is used, not in its type.
pub type Price = Decimal;

/// See [`Price`].
pub type Quantity = Decimal;

/// Default number of fractional places fees are rounded to before being
/// recorded on a [`crate::trade::Trade`].
pub const DEFAULT_FEE_PRECISION: u32 = 8;

/// Rounds `value` to `precision` fractional digits using round-half-to-even
/// (banker's rounding), as required by `spec.md` §4.4's numeric semantics.
pub fn round_half_even(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
}

/// Computes `quantity × price × rate`, rounded half-to-even to `precision`.
pub fn compute_fee(quantity: Quantity, price: Price, rate: Decimal, precision: u32) -> Decimal {
    round_half_even(quantity * price * rate, precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fee_rounds_half_to_even() {
        // 0.4 * 50000 * 0.0005 = 10.0 exactly, no rounding drama.
        let fee = compute_fee(dec!(0.4), dec!(50000), dec!(0.0005), DEFAULT_FEE_PRECISION);
        assert_eq!(fee, dec!(10.00000000));
    }

    #[test]
    fn round_half_even_ties_to_even_digit() {
        assert_eq!(round_half_even(dec!(0.125), 2), dec!(0.12));
        assert_eq!(round_half_even(dec!(0.135), 2), dec!(0.14));
    }
}
