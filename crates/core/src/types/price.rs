//! Decimal price representation with discount arithmetic.
//!
//! The backend transmits prices as decimal strings (`"149.90"`) and discount
//! fractions as decimal strings in `[0, 1]` (`"0.25"` = 25% off). All
//! arithmetic here is exact decimal - no binary floating point.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store currency.
///
/// Serialized as a decimal string on the wire, matching the backend
/// representation. Currency formatting is a presentation concern and does
/// not live here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price after applying a discount fraction in `[0, 1]`.
    ///
    /// A fraction of `0.25` takes 25% off. A fraction of zero returns the
    /// price unchanged.
    #[must_use]
    pub fn discounted(&self, fraction: Decimal) -> Self {
        Self(self.0 * (Decimal::ONE - fraction))
    }

    /// Line total for `quantity` units of this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_quarter_off() {
        let price: Price = "100.00".parse().unwrap();
        let fraction: Decimal = "0.25".parse().unwrap();
        assert_eq!(price.discounted(fraction), "75.00".parse().unwrap());
    }

    #[test]
    fn test_discounted_zero_fraction_is_identity() {
        let price: Price = "149.90".parse().unwrap();
        assert_eq!(price.discounted(Decimal::ZERO), price);
    }

    #[test]
    fn test_line_total() {
        let price: Price = "19.90".parse().unwrap();
        assert_eq!(price.line_total(3), "59.70".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_serde_decimal_string() {
        let price: Price = "149.90".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"149.90\"");

        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
