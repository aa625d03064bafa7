//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The till works in pesos, which have no minor unit:                     │
//! │    $12,345 is stored as 12345                                           │
//! │                                                                         │
//! │  Every drawer total is an exact integer sum.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! let sale = Money::from_pesos(1000);
//! let tip = Money::from_pesos(100);
//! assert_eq!((sale + tip).pesos(), 1100);
//! assert_eq!((sale + tip).to_string(), "$1,100");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values in the totals section
///   (expenses and losses are shown as negatives)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support; serializes as a bare number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale leg amount + tip ──► leg total ──► per-method totals              │
/// │                                               │                         │
/// │  Opening float ─────────────────────────────► expected cash             │
/// │                                               │                         │
/// │  Expenses, shrinkage, complimentary ────────► drawer total              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let float = Money::from_pesos(50_000);
    /// assert_eq!(float.pesos(), 50_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, or `None` when the sum leaves the `i64` range.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let a = Money::from_pesos(1000);
    /// assert_eq!(a.checked_add(Money::from_pesos(100)), Some(Money::from_pesos(1100)));
    /// assert_eq!(Money::from_pesos(i64::MAX).checked_add(Money::from_pesos(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(pesos) => Some(Money(pesos)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(pesos) => Some(Money(pesos)),
            None => None,
        }
    }

    /// Multiplies money by a count, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// // Seven $1,000 notes in the drawer
    /// let note = Money::from_pesos(1000);
    /// assert_eq!(note.checked_mul(7), Some(Money::from_pesos(7000)));
    /// assert_eq!(Money::from_pesos(20_000).checked_mul(i64::MAX / 10), None);
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(pesos) => Some(Money(pesos)),
            None => None,
        }
    }

    /// Sums an iterator of amounts, or `None` as soon as a partial sum
    /// overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$12,345` (comma thousands separator, no decimals).
///
/// ## Note
/// This matches the figures printed on the shift report. Localized
/// display belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a count.
///
/// Like the operators above this panics on overflow in debug builds;
/// totals built from till input use [`Money::checked_mul`].
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
    fn test_from_pesos() {
        let money = Money::from_pesos(12_345);
        assert_eq!(money.pesos(), 12_345);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_pesos(0).to_string(), "$0");
        assert_eq!(Money::from_pesos(999).to_string(), "$999");
        assert_eq!(Money::from_pesos(1000).to_string(), "$1,000");
        assert_eq!(Money::from_pesos(12_345).to_string(), "$12,345");
        assert_eq!(Money::from_pesos(1_234_567).to_string(), "$1,234,567");
        assert_eq!(Money::from_pesos(-500).to_string(), "-$500");
        assert_eq!(Money::from_pesos(-20_000).to_string(), "-$20,000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pesos(1000);
        let b = Money::from_pesos(500);

        assert_eq!((a + b).pesos(), 1500);
        assert_eq!((a - b).pesos(), 500);
        assert_eq!((-a).pesos(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.pesos(), 3000);
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_pesos(i64::MAX);

        assert_eq!(max.checked_add(Money::from_pesos(1)), None);
        assert_eq!(max.checked_add(Money::zero()), Some(max));
        assert_eq!(Money::from_pesos(i64::MIN).checked_sub(Money::from_pesos(1)), None);
        assert_eq!(
            Money::from_pesos(500).checked_sub(Money::from_pesos(800)),
            Some(Money::from_pesos(-300))
        );
        assert_eq!(Money::from_pesos(20_000).checked_mul(i64::MAX / 10), None);
        assert_eq!(Money::from_pesos(20_000).checked_mul(3), Some(Money::from_pesos(60_000)));
    }

    #[test]
    fn test_checked_sum() {
        let half = Money::from_pesos(i64::MAX / 2 + 1);
        assert_eq!(Money::checked_sum([half, half]), None);
        assert_eq!(Money::checked_sum([half]), Some(half));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_sum() {
        let values = [Money::from_pesos(100), Money::from_pesos(250), Money::from_pesos(50)];
        let total: Money = values.iter().sum();
        assert_eq!(total.pesos(), 400);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_pesos(100).is_positive());
        assert!(Money::from_pesos(-100).is_negative());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_pesos(5000)).unwrap();
        assert_eq!(json, "5000");
        let back: Money = serde_json::from_str("5000").unwrap();
        assert_eq!(back, Money::from_pesos(5000));
    }
}
