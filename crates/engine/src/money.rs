use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Money amount represented as **integer nano-units** (1 unit = 1e-9 of the
/// currency unit).
///
/// Use this type for **all** monetary values in the engine (spend, capacity,
/// fees, margins) to avoid floating-point drift. The raw reporting pipeline
/// upstream delivers nano amounts, so no conversion happens at the boundary.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyNano;
///
/// let amount = MoneyNano::new(3_000_000_000_000);
/// assert_eq!(amount.nanos(), 3_000_000_000_000);
/// assert_eq!(amount.to_string(), "3000.000000000");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct MoneyNano(i64);

impl MoneyNano {
    pub const ZERO: MoneyNano = MoneyNano(0);

    /// Nano-units per whole currency unit.
    pub const PER_UNIT: i64 = 1_000_000_000;

    /// Creates a new amount from integer nano-units.
    #[must_use]
    pub const fn new(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns the raw value in nano-units.
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyNano) -> Option<MoneyNano> {
        self.0.checked_add(rhs.0).map(MoneyNano)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyNano) -> Option<MoneyNano> {
        self.0.checked_sub(rhs.0).map(MoneyNano)
    }

    /// Subtraction clipped at zero.
    ///
    /// Remaining-capacity rule: a budget that already attributed more than
    /// its amount has zero capacity left, never a negative one.
    #[must_use]
    pub fn sub_or_zero(self, rhs: MoneyNano) -> MoneyNano {
        MoneyNano(self.0.saturating_sub(rhs.0).max(0))
    }
}

impl fmt::Display for MoneyNano {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / Self::PER_UNIT as u64;
        let nanos = abs % Self::PER_UNIT as u64;
        write!(f, "{sign}{units}.{nanos:09}")
    }
}

impl From<i64> for MoneyNano {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyNano> for i64 {
    fn from(value: MoneyNano) -> Self {
        value.0
    }
}

impl Add for MoneyNano {
    type Output = MoneyNano;

    fn add(self, rhs: MoneyNano) -> Self::Output {
        MoneyNano(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyNano {
    fn add_assign(&mut self, rhs: MoneyNano) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyNano {
    type Output = MoneyNano;

    fn sub(self, rhs: MoneyNano) -> Self::Output {
        MoneyNano(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyNano {
    fn sub_assign(&mut self, rhs: MoneyNano) {
        self.0 -= rhs.0;
    }
}

impl Sum for MoneyNano {
    fn sum<I: Iterator<Item = MoneyNano>>(iter: I) -> Self {
        iter.fold(MoneyNano::ZERO, Add::add)
    }
}

/// Fraction in **parts per billion**, used for license fees, margins and the
/// derived effective-spend factors.
///
/// The representation keeps fee math in integers end to end: applying a rate
/// multiplies in `i128` and truncates toward zero, matching the ledger's
/// truncation rule for fractional nano results.
///
/// Values are bounded to `[0, 1]`; fee fractions on credits are further
/// restricted to `[0, 1)` at the entity boundary.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(1_000_000_000);

    const PPB: i64 = 1_000_000_000;

    /// Creates a rate from parts per billion, rejecting values outside
    /// `[0, 1]`.
    pub fn from_ppb(ppb: i64) -> Result<Rate, EngineError> {
        if !(0..=Self::PPB).contains(&ppb) {
            return Err(EngineError::InvalidRate(format!(
                "rate out of range: {ppb} ppb"
            )));
        }
        Ok(Rate(ppb as u32))
    }

    /// Derives a rate from a ratio of two amounts, truncating toward zero.
    ///
    /// The numerator must not exceed the denominator: statement sums never
    /// exceed raw spend, so a ratio above one signals corrupted input.
    pub fn from_ratio(numerator: MoneyNano, denominator: MoneyNano) -> Result<Rate, EngineError> {
        if denominator.nanos() <= 0 || numerator.is_negative() {
            return Err(EngineError::InvalidRate(format!(
                "invalid ratio: {numerator} / {denominator}"
            )));
        }
        let ppb = numerator.nanos() as i128 * Self::PPB as i128 / denominator.nanos() as i128;
        Self::from_ppb(ppb as i64)
    }

    /// Returns the raw value in parts per billion.
    #[must_use]
    pub const fn ppb(self) -> u32 {
        self.0
    }

    /// Returns `true` if the rate is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiplies an amount by this rate, truncating toward zero.
    #[must_use]
    pub fn apply(self, amount: MoneyNano) -> MoneyNano {
        // rate <= ONE keeps the product within i64 after the division.
        let scaled = amount.nanos() as i128 * self.0 as i128 / Self::PPB as i128;
        MoneyNano::new(scaled as i64)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 as i64 / Self::PPB;
        let frac = self.0 as i64 % Self::PPB;
        write!(f, "{units}.{frac:09}")
    }
}

impl FromStr for Rate {
    type Err = EngineError;

    /// Parses a decimal string such as `0.2` into a rate.
    ///
    /// Validation rules:
    /// - max 9 fractional digits (rejects `0.0123456789`)
    /// - rejects negative, empty and out-of-range values
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidRate(format!("invalid rate: {s:?}"));

        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
            return Err(invalid());
        }

        let mut parts = trimmed.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let parsed: i64 = frac.parse().map_err(|_| invalid())?;
                parsed * 10i64.pow(9 - frac.len() as u32)
            }
        };

        let ppb = units
            .checked_mul(Self::PPB)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;
        Self::from_ppb(ppb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_nano_units() {
        assert_eq!(MoneyNano::ZERO.to_string(), "0.000000000");
        assert_eq!(MoneyNano::new(1).to_string(), "0.000000001");
        assert_eq!(MoneyNano::new(3_000_000_000_000).to_string(), "3000.000000000");
        assert_eq!(MoneyNano::new(-1_500_000_000).to_string(), "-1.500000000");
    }

    #[test]
    fn sub_or_zero_clips_at_zero() {
        let amount = MoneyNano::new(100);
        assert_eq!(amount.sub_or_zero(MoneyNano::new(40)), MoneyNano::new(60));
        assert_eq!(amount.sub_or_zero(MoneyNano::new(100)), MoneyNano::ZERO);
        assert_eq!(amount.sub_or_zero(MoneyNano::new(250)), MoneyNano::ZERO);
    }

    #[test]
    fn rate_parses_decimal_strings() {
        assert_eq!("0.2".parse::<Rate>().unwrap().ppb(), 200_000_000);
        assert_eq!("0.333333333".parse::<Rate>().unwrap().ppb(), 333_333_333);
        assert_eq!("1".parse::<Rate>().unwrap(), Rate::ONE);
        assert_eq!("0".parse::<Rate>().unwrap(), Rate::ZERO);
    }

    #[test]
    fn rate_rejects_invalid_strings() {
        assert!("".parse::<Rate>().is_err());
        assert!("-0.1".parse::<Rate>().is_err());
        assert!("0.0123456789".parse::<Rate>().is_err());
        assert!("1.5".parse::<Rate>().is_err());
        assert!("0.2.0".parse::<Rate>().is_err());
    }

    #[test]
    fn apply_truncates_toward_zero() {
        let fee = Rate::from_ppb(200_000_000).unwrap();
        assert_eq!(fee.apply(MoneyNano::new(1_000)), MoneyNano::new(200));
        // 0.2 * 7 = 1.4 -> truncates to 1
        assert_eq!(fee.apply(MoneyNano::new(7)), MoneyNano::new(1));
        assert_eq!(Rate::ZERO.apply(MoneyNano::new(1_000)), MoneyNano::ZERO);
        assert_eq!(Rate::ONE.apply(MoneyNano::new(1_000)), MoneyNano::new(1_000));
    }

    #[test]
    fn from_ratio_truncates() {
        let rate = Rate::from_ratio(MoneyNano::new(1), MoneyNano::new(3)).unwrap();
        assert_eq!(rate.ppb(), 333_333_333);
        assert!(Rate::from_ratio(MoneyNano::new(4), MoneyNano::new(3)).is_err());
        assert!(Rate::from_ratio(MoneyNano::new(1), MoneyNano::ZERO).is_err());
    }
}
