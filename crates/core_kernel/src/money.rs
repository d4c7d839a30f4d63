//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal. Arithmetic keeps full precision; rounding happens only
//! when a value is prepared for display or persistence.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use thiserror::Error;

/// Number of fractional digits used when money is displayed or persisted
pub const DISPLAY_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount
///
/// Money wraps a `Decimal` and never rounds implicitly, so long chains of
/// proportional arithmetic do not accumulate rounding error. Use
/// [`Money::round_for_display`] at the presentation boundary.
///
/// The operator impls panic on overflow exactly as `Decimal`'s do. Amounts
/// that come from user input go through the `checked_*` methods.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates Money from an integer amount in minor units (cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, DISPLAY_SCALE))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Rounds half away from zero to the given number of fractional digits
    pub fn round_half_up(&self, dp: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounds to the display precision (two fractional digits, half up)
    pub fn round_for_display(&self) -> Self {
        let mut rounded = self.round_half_up(DISPLAY_SCALE).0;
        rounded.rescale(DISPLAY_SCALE);
        Self(rounded)
    }

    /// Returns the display-rounded amount expressed in minor units (cents)
    pub fn to_minor(&self) -> Result<i128, MoneyError> {
        let scaled = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        scaled.to_i128().ok_or(MoneyError::Overflow)
    }

    /// Checked addition that reports overflow instead of panicking
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that reports overflow instead of panicking
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked multiplication by a scalar (quantity, proportion)
    pub fn checked_mul(&self, factor: Decimal) -> Result<Money, MoneyError> {
        self.0
            .checked_mul(factor)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Sums `amounts`, reporting overflow instead of panicking
    pub fn checked_sum<I>(amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(&m))
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.0
            .checked_div(divisor)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Splits the display-rounded amount across `weights` using the
    /// largest-remainder method.
    ///
    /// Every part is a whole number of cents and the parts sum to
    /// `self.round_for_display()` exactly. Leftover cents go to the parts with
    /// the largest fractional quota; ties favour the earlier weight. Parts
    /// with a zero weight always receive zero.
    ///
    /// # Errors
    ///
    /// * empty weights, a negative weight or a zero weight total
    /// * a negative amount
    /// * arithmetic overflow
    pub fn apportion(&self, weights: &[Decimal]) -> Result<Vec<Money>, MoneyError> {
        if weights.is_empty() {
            return Err(MoneyError::InvalidAmount("Empty weights".to_string()));
        }
        if weights.iter().any(|w| w.is_sign_negative() && !w.is_zero()) {
            return Err(MoneyError::InvalidAmount("Negative weight".to_string()));
        }
        if self.is_negative() {
            return Err(MoneyError::InvalidAmount(
                "Cannot apportion a negative amount".to_string(),
            ));
        }

        let total_weight = weights
            .iter()
            .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))
            .ok_or(MoneyError::Overflow)?;
        if total_weight.is_zero() {
            return Err(MoneyError::InvalidAmount("Total weight is zero".to_string()));
        }

        let target_minor = self.to_minor()?;
        let target = Decimal::from_i128_with_scale(target_minor, 0);

        let mut minors = Vec::with_capacity(weights.len());
        let mut remainders = Vec::with_capacity(weights.len());
        for weight in weights {
            let quota = target
                .checked_mul(*weight)
                .and_then(|v| v.checked_div(total_weight))
                .ok_or(MoneyError::Overflow)?;
            let whole = quota.trunc();
            minors.push(whole.to_i128().ok_or(MoneyError::Overflow)?);
            remainders.push(quota - whole);
        }

        let distributed: i128 = minors.iter().sum();
        let leftover = target_minor - distributed;

        if leftover != 0 {
            let mut order: Vec<usize> = (0..weights.len())
                .filter(|&i| !weights[i].is_zero())
                .collect();
            order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));
            if leftover < 0 {
                order.reverse();
            }
            let step = leftover.signum();
            for &i in order.iter().cycle().take(leftover.unsigned_abs() as usize) {
                minors[i] += step;
            }
        }

        minors
            .into_iter()
            .map(|minor| {
                i64::try_from(minor)
                    .map(Money::from_minor)
                    .map_err(|_| MoneyError::Overflow)
            })
            .collect()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round_for_display().0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn apportioned_parts_sum_to_rounded_amount(
            amount in 0i64..10_000_000i64,
            weights in prop::collection::vec(1i64..1_000_000i64, 1..40)
        ) {
            let money = Money::from_minor(amount);
            let weights: Vec<Decimal> = weights.into_iter().map(|w| Decimal::new(w, 2)).collect();
            let parts = money.apportion(&weights).unwrap();

            let total: Money = parts.iter().sum();
            prop_assert_eq!(total.amount(), money.round_for_display().amount());
            prop_assert!(parts.iter().all(|p| !p.is_negative()));
        }

        #[test]
        fn addition_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            let mc = Money::from_minor(c);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }
    }
}
