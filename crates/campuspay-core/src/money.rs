//! # Money Module
//!
//! Provides the `Money` type for handling fee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A term fee of ₹4000 split 4 ways must come back to ₹4000 exactly,  │
//! │  or the "Fully Paid" status check drifts by a paisa.                │
//! │                                                                     │
//! │  OUR SOLUTION: integer paise                                        │
//! │    400000 paise / 3 = 133333 paise (×3 = 399999 paise)              │
//! │    We KNOW where the remainder went, and handle it explicitly       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every amount in the ledger - term fees, payments, discounts, fines,
//! running totals - flows through this type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: a due amount can go negative transiently during
///   reconciliation checks; the overpayment guard relies on seeing it
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use campuspay_core::money::Money;
    ///
    /// let fee = Money::from_paise(400_000); // ₹4000.00
    /// assert_eq!(fee.paise(), 400_000);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use campuspay_core::money::Money;
    ///
    /// let fee = Money::from_rupees(4000); // ₹4000.00
    /// assert_eq!(fee.paise(), 400_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Subtraction floored at zero, for display-facing due amounts.
    ///
    /// ## Example
    /// ```rust
    /// use campuspay_core::money::Money;
    ///
    /// let due = Money::from_paise(100).saturating_sub(Money::from_paise(300));
    /// assert!(due.is_zero());
    /// ```
    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Multiplies by an integer fraction with exact integer arithmetic.
    ///
    /// Used for term-share computation: a 4-term schedule's cumulative
    /// expected amount after term N is `total.mul_frac(N, 4)`.
    ///
    /// Truncates toward zero; callers accumulate cumulative fractions
    /// (1/4, 2/4, 3/4, 4/4) rather than per-term shares so no paisa is
    /// lost across the schedule.
    pub const fn mul_frac(self, numerator: u32, denominator: u32) -> Self {
        // i128 to prevent overflow on large amounts
        let value = (self.0 as i128 * numerator as i128) / denominator as i128;
        Money(value as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and log/error messages; UI formatting (grouping,
/// localization) is the caller's concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
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

/// Multiplication by integer (term counts, row counts).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, n: i64) -> Self {
        Money(self.0 * n)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(400_099);
        assert_eq!(money.paise(), 400_099);
        assert_eq!(money.rupees(), 4000);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(4000).paise(), 400_000);
        assert_eq!(Money::from_rupees(-50).paise(), -5000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(400_050)), "₹4000.50");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.paise(), 500);
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::from_paise(100);
        let b = Money::from_paise(300);
        assert_eq!(a.saturating_sub(b), Money::zero());
        assert_eq!(b.saturating_sub(a).paise(), 200);
    }

    #[test]
    fn test_mul_frac_cumulative_shares() {
        // A 4-term schedule over ₹16000: cumulative thresholds land exactly.
        let total = Money::from_rupees(16_000);
        assert_eq!(total.mul_frac(1, 4), Money::from_rupees(4000));
        assert_eq!(total.mul_frac(2, 4), Money::from_rupees(8000));
        assert_eq!(total.mul_frac(4, 4), total);
    }

    #[test]
    fn test_mul_frac_truncation_documented() {
        // 100 paise split 3 ways truncates; the final cumulative fraction
        // (3/3) still recovers the full amount.
        let total = Money::from_paise(100);
        assert_eq!(total.mul_frac(1, 3).paise(), 33);
        assert_eq!(total.mul_frac(2, 3).paise(), 66);
        assert_eq!(total.mul_frac(3, 3).paise(), 100);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .iter()
            .map(|p| Money::from_paise(*p))
            .sum();
        assert_eq!(total.paise(), 600);
    }
}
