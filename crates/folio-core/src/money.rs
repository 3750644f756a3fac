//! # Money Module
//!
//! Provides the `Money` type used for book prices, order totals and report
//! revenue.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  REVENUE AGGREGATION                                                    │
//! │                                                                         │
//! │  A sales report sums price × quantity across every order in the        │
//! │  window. With floats the sum depends on iteration order:               │
//! │    (0.1 + 0.2) + 0.3 != 0.1 + (0.2 + 0.3)                              │
//! │                                                                         │
//! │  Integer cents make the total independent of map iteration order,     │
//! │  so two runs over the same orders always report the same revenue.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::money::Money;
//!
//! let price = Money::from_cents(1250); // $12.50
//! let line = price * 3;
//! assert_eq!(line.cents(), 3750);
//! ```
//!
//! Operators saturate at the `i64` bounds. Order totals go through the
//! `checked_*` forms so an overflowing order is rejected instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Serialized as a bare integer so snapshot files read `"price": 1250`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line total for `qty` units at this unit price, saturating at the
    /// `i64` bounds.
    ///
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// let unit = Money::from_cents(899);
    /// assert_eq!(unit.multiply_quantity(4).cents(), 3596);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Line total, or `None` when it does not fit in cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2499);
        assert_eq!(money.cents(), 2499);
        assert_eq!(money.to_string(), "$24.99");
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let unit = Money::from_cents(1000);
        assert_eq!(unit.checked_multiply_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(unit.checked_multiply_quantity(i64::MAX / 4), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_operators_saturate() {
        let big = Money::from_cents(i64::MAX);
        assert_eq!(big + Money::from_cents(5), big);
        assert_eq!(big * 2, big);
        assert_eq!(Money::from_cents(10).multiply_quantity(i64::MAX).cents(), i64::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1250).to_string(), "$12.50");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::from_cents(-320).to_string(), "-$3.20");
    }

    #[test]
    fn test_sum_is_order_independent() {
        let prices = [Money::from_cents(10), Money::from_cents(20), Money::from_cents(30)];
        let forward: Money = prices.iter().sum();
        let backward: Money = prices.iter().rev().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward.cents(), 60);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "1999");

        let parsed: Money = serde_json::from_str("450").unwrap();
        assert_eq!(parsed, Money::from_cents(450));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
