//! Exact decimal numbers
//!
//! Every number literal is decimal, and arithmetic never rounds: values are
//! kept as reduced big rationals so `0.1 * 10 * 3` is exactly `3`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

// ============================================================================
// Numeric Type
// ============================================================================

/// Arbitrary precision exact number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(BigRational);

/// Error produced when decimal literal text is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid number literal `{0}`")]
pub struct ParseNumberError(String);

impl Number {
    pub fn zero() -> Self {
        Number(BigRational::zero())
    }

    pub fn one() -> Self {
        Number(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Division, or `None` when the divisor is zero
    pub fn checked_div(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            None
        } else {
            Some(Number(&self.0 / &other.0))
        }
    }

    /// The number of decimal places needed to write this value exactly,
    /// or `None` if its decimal expansion never terminates.
    fn decimal_scale(&self) -> Option<u32> {
        let mut denom = self.0.denom().clone();
        let two = BigInt::from(2);
        let five = BigInt::from(5);
        let (mut twos, mut fives) = (0u32, 0u32);

        while (&denom % &two).is_zero() {
            denom /= &two;
            twos += 1;
        }
        while (&denom % &five).is_zero() {
            denom /= &five;
            fives += 1;
        }

        denom.is_one().then(|| twos.max(fives))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number(BigRational::from_integer(BigInt::from(n)))
    }
}

impl From<BigRational> for Number {
    fn from(r: BigRational) -> Self {
        Number(r)
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Parse `-?digits[.digits]` or `-?.digits`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseNumberError(s.to_string());

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{whole}{frac}");
        let mut numer = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        if negative {
            numer = -numer;
        }
        let scale = u32::try_from(frac.len()).map_err(|_| invalid())?;
        let denom = BigInt::from(10).pow(scale);

        Ok(Number(BigRational::new(numer, denom)))
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Add for &Number {
    type Output = Number;

    fn add(self, other: Self) -> Number {
        Number(&self.0 + &other.0)
    }
}

impl Sub for &Number {
    type Output = Number;

    fn sub(self, other: Self) -> Number {
        Number(&self.0 - &other.0)
    }
}

impl Mul for &Number {
    type Output = Number;

    fn mul(self, other: Self) -> Number {
        Number(&self.0 * &other.0)
    }
}

impl Neg for &Number {
    type Output = Number;

    fn neg(self) -> Number {
        Number(-&self.0)
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(scale) = self.decimal_scale() else {
            return write!(f, "{}/{}", self.0.numer(), self.0.denom());
        };
        if scale == 0 {
            return write!(f, "{}", self.0.numer());
        }

        let shifted = (&self.0 * BigRational::from_integer(BigInt::from(10).pow(scale))).to_integer();
        let sign = if shifted.sign() == Sign::Minus { "-" } else { "" };
        let mut digits = shifted.abs().to_string();
        let scale = scale as usize;
        if digits.len() <= scale {
            digits = format!("{}{digits}", "0".repeat(scale + 1 - digits.len()));
        }
        let (whole, frac) = digits.split_at(digits.len() - scale);

        write!(f, "{sign}{whole}.{frac}")
    }
}
