//! Monetary amounts with fixed-point semantics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A monetary amount with at most two decimal places.
///
/// Amounts are validated to be strictly positive on construction and are stored in the
/// database as an integer number of cents so that SQL arithmetic stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    ///
    /// The value is rounded to two decimal places.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `value` is not strictly positive after rounding,
    /// or is too large to be represented as 64-bit cents.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let value = value.round_dp(2);

        if value <= Decimal::ZERO || value > Decimal::new(i64::MAX, 2) {
            return Err(Error::InvalidAmount(value));
        }

        Ok(Self(value))
    }

    /// Create an amount from an integer number of cents.
    ///
    /// This is intended for values coming out of the application's database, which are
    /// non-negative by construction.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount as an integer number of cents.
    pub fn as_cents(&self) -> i64 {
        decimal_to_cents(self.0)
    }

    /// The amount as a decimal number of whole currency units.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

/// Convert a decimal currency value into an integer number of cents, rounding to two
/// decimal places. Values beyond the 64-bit cent range saturate.
pub(crate) fn decimal_to_cents(value: Decimal) -> i64 {
    let value = value.round_dp(2);
    // The scale is at most two after rounding, so shifting the mantissa up to two digits
    // always yields an exact integer number of cents.
    let cents = value.mantissa() * 10i128.pow(2 - value.scale());

    cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Convert an integer number of cents into a decimal currency value.
pub(crate) fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
