//! Currency codes and currency-tagged amounts.
//!
//! Pricing functions return a [`CurrencyAmount`] rather than a bare `f64` so
//! that aggregation across instruments cannot silently mix currencies.

use std::fmt;
use std::ops::Neg;

/// ISO 4217 currency codes used by the pricing layer.
///
/// # Examples
///
/// ```
/// use sabr_core::types::Currency;
///
/// assert_eq!(Currency::EUR.code(), "EUR");
/// ```
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Currency {
    /// United States Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
}

impl Currency {
    /// Returns the ISO 4217 three-letter currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A scalar amount tagged with its currency.
///
/// Addition is only defined between amounts of the same currency;
/// [`CurrencyAmount::checked_add`] returns `None` on a mismatch.
///
/// # Examples
///
/// ```
/// use sabr_core::types::{Currency, CurrencyAmount};
///
/// let a = CurrencyAmount::new(100.0, Currency::EUR);
/// let b = CurrencyAmount::new(25.0, Currency::EUR);
/// let sum = a.checked_add(b).unwrap();
/// assert_eq!(sum.value, 125.0);
/// assert!(a.checked_add(CurrencyAmount::new(1.0, Currency::USD)).is_none());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrencyAmount {
    /// The amount value.
    pub value: f64,
    /// The currency of the amount.
    pub currency: Currency,
}

impl CurrencyAmount {
    /// Create a new currency amount.
    #[inline]
    pub fn new(value: f64, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Add two amounts of the same currency; `None` if currencies differ.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency == other.currency {
            Some(Self::new(self.value + other.value, self.currency))
        } else {
            None
        }
    }

    /// Scale the amount by a factor.
    #[inline]
    pub fn multiplied_by(self, factor: f64) -> Self {
        Self::new(self.value * factor, self.currency)
    }
}

impl Neg for CurrencyAmount {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, self.currency)
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::JPY.code(), "JPY");
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(format!("{}", Currency::GBP), "GBP");
    }

    #[test]
    fn test_amount_checked_add_same_currency() {
        let a = CurrencyAmount::new(1.5, Currency::EUR);
        let b = CurrencyAmount::new(2.5, Currency::EUR);
        let sum = a.checked_add(b).unwrap();
        assert_eq!(sum.value, 4.0);
        assert_eq!(sum.currency, Currency::EUR);
    }

    #[test]
    fn test_amount_checked_add_mismatch() {
        let a = CurrencyAmount::new(1.0, Currency::EUR);
        let b = CurrencyAmount::new(1.0, Currency::CHF);
        assert!(a.checked_add(b).is_none());
    }

    #[test]
    fn test_amount_negation() {
        let a = CurrencyAmount::new(10.0, Currency::USD);
        let neg = -a;
        assert_eq!(neg.value, -10.0);
        assert_eq!(neg.currency, Currency::USD);
    }

    #[test]
    fn test_amount_multiplied_by() {
        let a = CurrencyAmount::new(3.0, Currency::EUR);
        assert_eq!(a.multiplied_by(-2.0).value, -6.0);
    }

    #[test]
    fn test_amount_display() {
        let a = CurrencyAmount::new(12.5, Currency::EUR);
        assert_eq!(format!("{}", a), "EUR 12.5");
    }
}
