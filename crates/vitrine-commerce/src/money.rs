//! Money type for representing monetary values.
//!
//! Uses minor-unit integer representation (paise, cents) to avoid the
//! floating-point precision issues that plague monetary calculations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., paise
/// for INR). Arithmetic is checked: operations return `None` on currency
/// mismatch or integer overflow, and callers decide how to surface that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., paise).
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Add another Money value, checking currency and overflow.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|a| Money::new(a, self.currency))
    }

    /// Subtract another Money value, checking currency and overflow.
    pub fn checked_sub(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|a| Money::new(a, self.currency))
    }

    /// Multiply by a scalar, checking overflow.
    pub fn checked_mul(&self, factor: i64) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|a| Money::new(a, self.currency))
    }

    /// Calculate a whole-number percentage of this amount, rounding
    /// half-up. Only defined for non-negative amounts; returns `None`
    /// on a negative amount or overflow.
    ///
    /// ```
    /// use vitrine_commerce::money::{Currency, Money};
    /// let subtotal = Money::new(2500, Currency::INR);
    /// assert_eq!(subtotal.percent_half_up(12).unwrap().amount, 300);
    /// ```
    pub fn percent_half_up(&self, percent: u32) -> Option<Money> {
        if self.amount < 0 {
            return None;
        }
        let scaled = self.amount.checked_mul(i64::from(percent))?;
        let rounded = scaled.checked_add(50)? / 100;
        Some(Money::new(rounded, self.currency))
    }

    /// Sum an iterator of Money values, checking currency and overflow.
    pub fn checked_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut acc = Money::zero(currency);
        for m in iter {
            acc = acc.checked_add(m)?;
        }
        Some(acc)
    }

    /// Format as a display string (e.g., "₹49.99").
    pub fn display(&self) -> String {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        let whole = self.amount / divisor;
        let frac = (self.amount % divisor).abs();
        format!(
            "{}{}.{:0width$}",
            self.currency.symbol(),
            whole,
            frac,
            width = self.currency.decimal_places() as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor_units() {
        let m = Money::new(4999, Currency::INR);
        assert_eq!(m.amount, 4999);
        assert_eq!(m.currency, Currency::INR);
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(4999, Currency::USD);
        assert_eq!(m.display(), "$49.99");

        let m = Money::new(100, Currency::INR);
        assert_eq!(m.display(), "\u{20b9}1.00");
    }

    #[test]
    fn test_checked_addition() {
        let a = Money::new(1000, Currency::INR);
        let b = Money::new(500, Currency::INR);
        assert_eq!(a.checked_add(&b).unwrap().amount, 1500);
    }

    #[test]
    fn test_currency_mismatch() {
        let inr = Money::new(1000, Currency::INR);
        let usd = Money::new(1000, Currency::USD);
        assert!(inr.checked_add(&usd).is_none());
        assert!(inr.checked_sub(&usd).is_none());
    }

    #[test]
    fn test_checked_mul_overflow() {
        let m = Money::new(i64::MAX / 2, Currency::INR);
        assert!(m.checked_mul(3).is_none());
        assert!(m.checked_mul(1).is_some());
    }

    #[test]
    fn test_percent_half_up() {
        // 12% of 2500 = 300 exactly
        assert_eq!(
            Money::new(2500, Currency::INR).percent_half_up(12).unwrap().amount,
            300
        );
        // 12% of 104 = 12.48 -> 12
        assert_eq!(
            Money::new(104, Currency::INR).percent_half_up(12).unwrap().amount,
            12
        );
        // 12% of 625 = 75.0 -> 75; 12% of 621 = 74.52 -> 75
        assert_eq!(
            Money::new(621, Currency::INR).percent_half_up(12).unwrap().amount,
            75
        );
        // half rounds up: 50% of 3 = 1.5 -> 2
        assert_eq!(
            Money::new(3, Currency::INR).percent_half_up(50).unwrap().amount,
            2
        );
    }

    #[test]
    fn test_checked_sum() {
        let values = [
            Money::new(100, Currency::INR),
            Money::new(250, Currency::INR),
        ];
        let total = Money::checked_sum(values.iter(), Currency::INR).unwrap();
        assert_eq!(total.amount, 350);

        let mixed = [
            Money::new(100, Currency::INR),
            Money::new(250, Currency::USD),
        ];
        assert!(Money::checked_sum(mixed.iter(), Currency::INR).is_none());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("inr"), Some(Currency::INR));
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
