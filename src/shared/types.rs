//! Common types used across the application

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use crate::shared::errors::AmmError;

/// Milliseconds since the Unix epoch
pub type TimestampMs = i64;

/// Height of the chain the service settles against
pub type BlockHeight = u64;

/// Fractional digits kept by division and square root
pub const DIVISION_SCALE: i64 = 18;

/// Widest integer part accepted from input
pub const MAX_INTEGER_DIGITS: i64 = 78;

/// Most fractional digits accepted from input
pub const MAX_FRACTION_DIGITS: i64 = 2 * DIVISION_SCALE;

/// Rune token metadata. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneToken {
    pub rune_id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub creator: String,
    pub timestamp: TimestampMs,
}

/// Non-negative token amount with exact decimal precision.
///
/// Addition and multiplication are exact. Division and square root
/// truncate toward zero at [`DIVISION_SCALE`] fractional digits, so a
/// computed payout never exceeds what the exact result would be.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn zero() -> Self {
        Self(BigDecimal::zero())
    }

    /// Parse a non-negative decimal string.
    ///
    /// Values wider than [`MAX_INTEGER_DIGITS`] integer digits or finer than
    /// [`MAX_FRACTION_DIGITS`] fractional digits are rejected.
    pub fn parse(value: &str) -> Result<Self, AmmError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmmError::InvalidAmount("empty amount".to_string()));
        }

        let parsed = BigDecimal::from_str(trimmed)
            .map_err(|_| AmmError::InvalidAmount(format!("not a decimal: {}", value)))?;
        if parsed < BigDecimal::zero() {
            return Err(AmmError::InvalidAmount(format!("negative amount: {}", value)));
        }

        let normalized = parsed.normalized();
        let scale = normalized.fractional_digit_count();
        if scale > MAX_FRACTION_DIGITS {
            return Err(AmmError::InvalidAmount(format!(
                "more than {} fractional digits: {}",
                MAX_FRACTION_DIGITS, value
            )));
        }
        let integer_digits = i64::try_from(normalized.digits())
            .unwrap_or(i64::MAX)
            .saturating_sub(scale);
        if integer_digits > MAX_INTEGER_DIGITS {
            return Err(AmmError::InvalidAmount(format!(
                "more than {} integer digits: {}",
                MAX_INTEGER_DIGITS, value
            )));
        }

        Ok(Self(parsed))
    }

    /// `units * 10^-scale`, exact
    pub fn from_scaled(units: u64, scale: i64) -> Self {
        Self(BigDecimal::new(BigInt::from(units), scale))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > BigDecimal::zero()
    }

    /// Subtract, failing instead of going below zero
    pub fn checked_sub(&self, rhs: &Amount) -> Option<Amount> {
        if rhs.0 > self.0 {
            return None;
        }
        Some(Self(&self.0 - &rhs.0))
    }

    /// Truncating division; `None` when dividing by zero or the operands'
    /// scales are too far apart to line up
    pub fn checked_div(&self, rhs: &Amount) -> Option<Amount> {
        div_truncated(&self.0, &rhs.0).map(Self)
    }

    /// Truncating square root; `None` when the scale is out of range
    pub fn sqrt(&self) -> Option<Amount> {
        let (digits, scale) = self.0.as_bigint_and_exponent();
        // sqrt(d * 10^-scale) * 10^S == sqrt(d * 10^(2S - scale))
        let shift = (2 * DIVISION_SCALE).checked_sub(scale)?;
        let radicand = if shift >= 0 {
            digits * pow10(shift)?
        } else {
            digits / pow10(shift.checked_neg()?)?
        };
        Some(Self(BigDecimal::new(radicand.sqrt(), DIVISION_SCALE)))
    }

    /// `(self - other) / self` as a percentage, truncated at
    /// [`DIVISION_SCALE`] digits. Negative when `other` is larger, `None`
    /// when `self` is zero.
    pub fn percent_drop_to(&self, other: &Amount) -> Option<Ratio> {
        let delta = &self.0 - &other.0;
        let fraction = div_truncated(&delta, &self.0)?;
        Some(Ratio(fraction * BigDecimal::from(100)))
    }

    pub fn abs_diff(&self, other: &Amount) -> Amount {
        if self >= other {
            Self(&self.0 - &other.0)
        } else {
            Self(&other.0 - &self.0)
        }
    }

    /// Lossy view for display-only fields
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

/// Signed decimal produced by comparing two amounts
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ratio(BigDecimal);

impl Ratio {
    /// Lossy view for display-only fields
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&plain_string(&self.0))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&plain_string(&self.0))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;

    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Mul for Amount {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Amount {
        Amount(self.0 * rhs.0)
    }
}

impl<'a> Mul<&'a Amount> for &'a Amount {
    type Output = Amount;

    fn mul(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 * &rhs.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(de::Error::custom)
    }
}

/// `10^exp`; `None` for exponents outside `0..=u32::MAX`
fn pow10(exp: i64) -> Option<BigInt> {
    let exp = u32::try_from(exp).ok()?;
    Some(BigInt::from(10u32).pow(exp))
}

/// Signed division truncated toward zero at [`DIVISION_SCALE`] digits
fn div_truncated(lhs: &BigDecimal, rhs: &BigDecimal) -> Option<BigDecimal> {
    if rhs.is_zero() {
        return None;
    }

    let (num, num_scale) = lhs.as_bigint_and_exponent();
    let (den, den_scale) = rhs.as_bigint_and_exponent();
    // (n * 10^-ns) / (d * 10^-ds) * 10^S == n * 10^(S + ds - ns) / d
    let shift = DIVISION_SCALE
        .checked_add(den_scale)?
        .checked_sub(num_scale)?;
    let (num, den) = if shift >= 0 {
        (num * pow10(shift)?, den)
    } else {
        (num, den * pow10(shift.checked_neg()?)?)
    };

    Some(BigDecimal::new(num / den, DIVISION_SCALE))
}

/// Positional rendering with trailing fractional zeros removed
fn plain_string(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let negative = digits < BigInt::zero();
    let mut body = if negative { (-digits).to_string() } else { digits.to_string() };

    if scale <= 0 {
        if body != "0" {
            let Some(zeros) = scale.checked_neg().and_then(|n| usize::try_from(n).ok()) else {
                return value.to_string();
            };
            body.push_str(&"0".repeat(zeros));
        }
    } else {
        let Ok(scale) = usize::try_from(scale) else {
            return value.to_string();
        };
        if body.len() <= scale {
            body = format!("{}{}", "0".repeat(scale + 1 - body.len()), body);
        }
        let (int_part, frac_part) = body.split_at(body.len() - scale);
        let frac_part = frac_part.trim_end_matches('0');
        let rendered = if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac_part)
        };
        body = rendered;
    }

    if negative && body != "0" {
        format!("-{}", body)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(matches!(Amount::parse("-1"), Err(AmmError::InvalidAmount(_))));
        assert!(matches!(Amount::parse("abc"), Err(AmmError::InvalidAmount(_))));
        assert!(matches!(Amount::parse("  "), Err(AmmError::InvalidAmount(_))));
        assert_eq!(amount(" 12.50 ").to_string(), "12.5");
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let third = amount("1").checked_div(&amount("3")).unwrap();
        assert_eq!(third.to_string(), "0.333333333333333333");

        let two_thirds = amount("2").checked_div(&amount("3")).unwrap();
        assert_eq!(two_thirds.to_string(), "0.666666666666666666");

        assert!(amount("1").checked_div(&Amount::zero()).is_none());
    }

    #[test]
    fn test_division_handles_mixed_scales() {
        let q = amount("1e5").checked_div(&amount("0.25")).unwrap();
        assert_eq!(q, amount("400000"));
        assert_eq!(q.to_string(), "400000");
    }

    #[test]
    fn test_parse_bounds_magnitude_and_precision() {
        for huge in ["1e4294967296", "1e79", "1e-4294967296", "0.0000000000000000000000000000000000001"] {
            assert!(
                matches!(Amount::parse(huge), Err(AmmError::InvalidAmount(_))),
                "{} should be rejected",
                huge
            );
        }

        let widest = "9".repeat(78);
        assert_eq!(amount(&widest).to_string(), widest);
        assert_eq!(amount("1e77").to_string().len(), 78);
        assert_eq!(amount("1.500000000000000000000000000000000000000000").to_string(), "1.5");
        assert_eq!(amount("0.000000000000000000000000000000000001").to_string().len(), 38);
    }

    #[test]
    fn test_division_at_widest_inputs_stays_exact() {
        let widest = amount("1e77");
        let q = widest.checked_div(&amount("1")).unwrap();
        assert_eq!(q, widest);

        let tiny = amount("0.000000000000000000000000000000000001");
        let q = amount("1").checked_div(&tiny).unwrap();
        assert_eq!(q, amount("1e36"));
    }

    #[test]
    fn test_sqrt_truncates() {
        assert_eq!(amount("100000000").sqrt(), Some(amount("10000")));
        assert_eq!(amount("2").sqrt().unwrap().to_string(), "1.414213562373095048");
        assert!(Amount::zero().sqrt().unwrap().is_zero());
        assert_eq!(amount("1e76").sqrt(), Some(amount("1e38")));
    }

    #[test]
    fn test_percent_drop_is_signed() {
        let drop = amount("200").percent_drop_to(&amount("150")).unwrap();
        assert_eq!(drop.to_string(), "25");

        let rise = amount("200").percent_drop_to(&amount("250")).unwrap();
        assert_eq!(rise.to_string(), "-25");
        assert!(rise.to_f64() < 0.0);

        assert!(Amount::zero().percent_drop_to(&amount("1")).is_none());
    }

    #[test]
    fn test_from_scaled_is_exact() {
        assert_eq!(Amount::from_scaled(997, 3), amount("0.997"));
        assert_eq!(Amount::from_scaled(50, 4).to_string(), "0.005");
    }

    #[test]
    fn test_checked_sub_never_goes_negative() {
        assert_eq!(amount("5").checked_sub(&amount("2")), Some(amount("3")));
        assert_eq!(amount("2").checked_sub(&amount("5")), None);
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let sum = &amount("0.1") + &amount("0.2");
        assert_eq!(sum, amount("0.3"));

        let product = &amount("1.5") * &amount("1.5");
        assert_eq!(product.to_string(), "2.25");
    }

    #[test]
    fn test_plain_string_formats_small_and_large_values() {
        assert_eq!(amount("0.000000000000000001").to_string(), "0.000000000000000001");
        assert_eq!(amount("1e20").to_string(), "100000000000000000000");
        assert_eq!(Amount::zero().to_string(), "0");
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let json = serde_json::to_string(&amount("987.25")).unwrap();
        assert_eq!(json, "\"987.25\"");

        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount("987.25"));

        assert!(serde_json::from_str::<Amount>("\"-3\"").is_err());
    }
}
