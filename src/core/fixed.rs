//! Deterministic 32.32 fixed-point arithmetic
//!
//! All opinion and gold math goes through `FixedPoint64`. Floats are never
//! used for simulation state: identical inputs must produce bit-identical
//! results on every platform, otherwise lockstep multiplayer and replays
//! diverge.
//!
//! Overflow saturates at `MIN`/`MAX` instead of wrapping or panicking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

const FRACTION_BITS: u32 = 32;
const FRACTION_MASK: u64 = (1u64 << FRACTION_BITS) - 1;

/// 64-bit fixed-point number with 32 integer bits and 32 fraction bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedPoint64(i64);

impl FixedPoint64 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << FRACTION_BITS);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    /// Construct from the raw backing integer
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Construct from a whole number
    pub const fn from_int(value: i32) -> Self {
        Self((value as i64) << FRACTION_BITS)
    }

    /// Construct `numerator / denominator` exactly (truncated toward zero)
    ///
    /// A zero denominator saturates by the sign of the numerator.
    pub fn from_fraction(numerator: i64, denominator: i64) -> Self {
        Self::from_int_ratio((numerator as i128) << FRACTION_BITS, denominator as i128)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Integer part, rounded toward negative infinity
    pub const fn to_int(self) -> i64 {
        self.0 >> FRACTION_BITS
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn clamp(self, min: Self, max: Self) -> Self {
        if self < min {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }

    /// `self * numerator / denominator` with a single rounding step
    ///
    /// Used by decay math so that e.g. -50 * 1800 / 3600 is exactly -25.
    pub fn mul_ratio(self, numerator: i64, denominator: i64) -> Self {
        Self::from_int_ratio(self.0 as i128 * numerator as i128, denominator as i128)
    }

    fn from_int_ratio(numerator: i128, denominator: i128) -> Self {
        if denominator == 0 {
            return match numerator.signum() {
                1 => Self::MAX,
                -1 => Self::MIN,
                _ => Self::ZERO,
            };
        }
        Self::saturate(numerator / denominator)
    }

    fn saturate(value: i128) -> Self {
        if value > i64::MAX as i128 {
            Self::MAX
        } else if value < i64::MIN as i128 {
            Self::MIN
        } else {
            Self(value as i64)
        }
    }
}

impl Add for FixedPoint64 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for FixedPoint64 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedPoint64 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for FixedPoint64 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FixedPoint64 {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Mul for FixedPoint64 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        // Arithmetic shift rounds toward negative infinity on every platform
        Self::saturate((self.0 as i128 * rhs.0 as i128) >> FRACTION_BITS)
    }
}

impl Mul<i64> for FixedPoint64 {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Div for FixedPoint64 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::from_int_ratio((self.0 as i128) << FRACTION_BITS, rhs.0 as i128)
    }
}

impl Sum for FixedPoint64 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for FixedPoint64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude >> FRACTION_BITS;
        let frac = ((magnitude & FRACTION_MASK) as u128 * 10_000) >> FRACTION_BITS;
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:04}", sign, whole, frac)
    }
}
