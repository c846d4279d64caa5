//! Conversion of customer-facing amounts into gateway minor units.
//!
//! The storefront prices goods in major units (rupees) as floating point
//! numbers. The gateway only accepts integer minor units (paise). The
//! conversion below is the single authoritative place where that happens.
//!
//! # Rounding
//!
//! `minor = round(major * 100)` with `f64::round`, which rounds halves away
//! from zero. Amounts are always positive here, so this is round-half-up.
//! `499.999` becomes `50000`, never `49999`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::PaymentError;

/// Number of minor units in one major unit.
const MINOR_PER_MAJOR: f64 = 100.0;

/// Integer amount in the currency's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    /// Wraps a raw minor-unit amount.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Converts a major-unit amount into minor units.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the amount is not finite, not strictly positive,
    /// rounds to zero minor units, or does not fit in `u64`.
    pub fn from_major(amount: f64) -> Result<Self, PaymentError> {
        if !amount.is_finite() {
            return Err(PaymentError::invalid_argument("amount must be a finite number"));
        }
        if amount <= 0.0 {
            return Err(PaymentError::invalid_argument("amount must be greater than zero"));
        }

        let minor = (amount * MINOR_PER_MAJOR).round();

        if minor < 1.0 {
            return Err(PaymentError::invalid_argument(
                "amount is smaller than the smallest currency unit",
            ));
        }
        // u64::MAX is not exactly representable; anything at or above 2^64 overflows.
        if minor >= u64::MAX as f64 {
            return Err(PaymentError::invalid_argument("amount is too large"));
        }

        Ok(Self(minor as u64))
    }

    /// Returns the raw minor-unit value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minor(amount: f64) -> u64 {
        MinorUnits::from_major(amount).unwrap().value()
    }

    #[test]
    fn whole_amounts_convert_exactly() {
        assert_eq!(minor(1.0), 100);
        assert_eq!(minor(499.0), 49_900);
        assert_eq!(minor(100_000.0), 10_000_000);
    }

    #[test]
    fn fractional_amounts_round_to_nearest_paisa() {
        assert_eq!(minor(19.99), 1_999);
        assert_eq!(minor(0.01), 1);
        assert_eq!(minor(1_299.5), 129_950);
    }

    #[test]
    fn sub_paisa_boundary_rounds_up_not_truncates() {
        // 499.999 * 100 = 49999.9 which truncation would turn into 49999
        assert_eq!(minor(499.999), 50_000);
    }

    #[test]
    fn exact_half_paisa_rounds_up() {
        // 0.125 and 1.125 are exactly representable in binary
        assert_eq!(minor(0.125), 13);
        assert_eq!(minor(1.125), 113);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(
            MinorUnits::from_major(0.0),
            Err(PaymentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn negative_is_rejected() {
        assert!(matches!(
            MinorUnits::from_major(-5.0),
            Err(PaymentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        assert!(MinorUnits::from_major(f64::NAN).is_err());
        assert!(MinorUnits::from_major(f64::INFINITY).is_err());
        assert!(MinorUnits::from_major(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn amount_rounding_to_zero_is_rejected() {
        assert!(MinorUnits::from_major(0.004).is_err());
    }

    #[test]
    fn overflowing_amount_is_rejected() {
        assert!(MinorUnits::from_major(1e30).is_err());
    }

    proptest! {
        #[test]
        fn conversion_matches_rounded_product(amount in 0.01f64..1_000_000.0) {
            let expected = (amount * 100.0).round() as u64;
            prop_assert_eq!(minor(amount), expected);
        }

        #[test]
        fn conversion_never_drifts_more_than_half_a_paisa(amount in 0.01f64..1_000_000.0) {
            let converted = minor(amount) as f64;
            prop_assert!((converted - amount * 100.0).abs() <= 0.5);
        }
    }
}
