use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// ISO-4217 currency codes are always three letters long.
pub const CURRENCY_CODE_LEN: usize = 3;

// Anything larger than this cannot survive the round trip through an f64 without losing cents.
const MAX_SAFE_CENTS: i64 = 9_000_000_000_000_000;

//--------------------------------------       Cents         ---------------------------------------------------------
/// A fixed-point currency amount with exactly two decimal places, stored as a whole number of hundredths.
///
/// Amounts are compared exactly, so a quoted price of `2.45` only ever equals a processor-reported `"2.45"` (or
/// `"2.450"`), and never some float that happens to print the same.
#[derive(Debug, Clone, Copy, Default, Type, Hash, Ord, PartialOrd, PartialEq, Eq)]
#[sqlx(transparent)]
pub struct Cents(i64);

op!(binary Cents, Add, add);
op!(binary Cents, Sub, sub);
op!(inplace Cents, AddAssign, add_assign);
op!(inplace Cents, SubAssign, sub_assign);
op!(unary Cents, Neg, neg);

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as a two-decimal amount: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Rounds a decimal value to the nearest cent (half away from zero).
    pub fn from_decimal_rounded(value: f64) -> Result<Self, CentsConversionError> {
        if !value.is_finite() {
            return Err(CentsConversionError(format!("{value} is not a finite number")));
        }
        let scaled = (value * 100.0).round();
        if scaled.abs() > MAX_SAFE_CENTS as f64 {
            return Err(CentsConversionError(format!("{value} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(scaled as i64))
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Cents {
    type Err = CentsConversionError;

    /// Parses decimal strings such as `"2.45"`, `"2.4"`, `"2"` or `"-1.00"`.
    ///
    /// Trailing zeros beyond the second decimal place are accepted, but any other sub-cent digit is an error rather
    /// than being silently rounded away.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CentsConversionError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((_, "")) => return Err(err()),
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }
        let (significant, rest) = frac.split_at(frac.len().min(2));
        if rest.bytes().any(|b| b != b'0') {
            return Err(err());
        }
        let whole = whole.parse::<i64>().map_err(|_| err())?;
        let mut fraction = if significant.is_empty() { 0 } else { significant.parse::<i64>().map_err(|_| err())? };
        if significant.len() == 1 {
            fraction *= 10;
        }
        let cents = whole.checked_mul(100).and_then(|v| v.checked_add(fraction)).ok_or_else(err)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
