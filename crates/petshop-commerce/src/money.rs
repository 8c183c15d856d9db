//! Money type for representing monetary values.
//!
//! Uses integer minor-unit representation to avoid floating-point
//! precision issues that plague monetary calculations. The reference
//! deployment prices everything in VND, which has no minor unit, so a
//! `Money` of 500_000 VND is exactly 500,000 dong.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    VND,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "VND").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "\u{20ab}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::VND => 0,
            _ => 2,
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
/// Amounts are stored in the smallest unit of the currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a VND amount (the default currency of the shop).
    pub fn vnd(amount: i64) -> Self {
        Self::new(amount, Currency::VND)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Try to add another Money value, returning None on currency
    /// mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Some(Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount.checked_sub(other.amount)?;
        Some(Money::new(amount, self.currency))
    }

    /// Try to multiply by a scalar.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let amount = self.amount.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Calculate an integer percentage of this amount, rounding down.
    pub fn percentage(&self, percent: u32) -> Option<Money> {
        let amount = self.amount.checked_mul(i64::from(percent))? / 100;
        Some(Money::new(amount, self.currency))
    }

    /// The smaller of two amounts. Assumes matching currencies.
    pub fn min(self, other: Money) -> Money {
        if self.amount <= other.amount {
            self
        } else {
            other
        }
    }

    /// Sum an iterator of Money values; None on mismatch or overflow.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut total = Money::zero(currency);
        for m in iter {
            total = total.try_add(m)?;
        }
        Some(total)
    }

    /// Format as a display string (e.g., "500000 VND").
    pub fn display(&self) -> String {
        format!("{} {}", self.amount, self.currency.code())
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
    fn test_money_addition() {
        let a = Money::vnd(100_000);
        let b = Money::vnd(50_000);
        assert_eq!(a.try_add(&b), Some(Money::vnd(150_000)));
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::vnd(100_000);
        let b = Money::vnd(30_000);
        assert_eq!(a.try_subtract(&b), Some(Money::vnd(70_000)));
    }

    #[test]
    fn test_money_currency_mismatch() {
        let vnd = Money::vnd(1000);
        let usd = Money::new(1000, Currency::USD);
        assert_eq!(vnd.try_add(&usd), None);
    }

    #[test]
    fn test_money_multiply() {
        let m = Money::vnd(100_000);
        assert_eq!(m.try_multiply(3), Some(Money::vnd(300_000)));
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::vnd(1_000_000);
        assert_eq!(m.percentage(10), Some(Money::vnd(100_000)));
    }

    #[test]
    fn test_money_min() {
        let a = Money::vnd(50_000);
        let b = Money::vnd(100_000);
        assert_eq!(a.min(b), Money::vnd(50_000));
        assert_eq!(b.min(a), Money::vnd(50_000));
    }

    #[test]
    fn test_money_sum() {
        let values = [Money::vnd(100), Money::vnd(200), Money::vnd(300)];
        let total = Money::try_sum(values.iter(), Currency::VND);
        assert_eq!(total, Some(Money::vnd(600)));
    }

    #[test]
    fn test_money_overflow() {
        let m = Money::vnd(i64::MAX);
        assert_eq!(m.try_add(&Money::vnd(1)), None);
        assert_eq!(m.try_multiply(2), None);
    }
}
