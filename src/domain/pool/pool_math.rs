//! Constant-product pricing (`x * y = k`)

use std::fmt;

use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, Ratio};

/// Fees are expressed in tenths of a percent
pub const FEE_DENOMINATOR: u32 = 1000;

/// Input left after the pool fee: `amount_in * (1000 - fee) / 1000`
pub(crate) fn amount_after_fee(amount_in: &Amount, fee: u32) -> Result<Amount, AmmError> {
    if fee >= FEE_DENOMINATOR {
        return Err(AmmError::InvalidFee(fee));
    }
    // dividing by 1000 is exact in decimal, so scale the multiplier instead
    let multiplier = Amount::from_scaled(u64::from(FEE_DENOMINATOR - fee), 3);
    Ok(amount_in * &multiplier)
}

/// Output amount for selling `amount_in` into the pool.
///
/// The fee is deducted from the input before the invariant is applied:
/// `out = in' * reserve_out / (reserve_in + in')`.
pub fn quote_swap(
    amount_in: &Amount,
    reserve_in: &Amount,
    reserve_out: &Amount,
    fee: u32,
) -> Result<Amount, AmmError> {
    let in_after_fee = amount_after_fee(amount_in, fee)?;
    let numerator = &in_after_fee * reserve_out;
    let denominator = reserve_in + &in_after_fee;

    numerator.checked_div(&denominator).ok_or_else(|| {
        AmmError::InsufficientLiquidity("input reserve and amount are both zero".to_string())
    })
}

/// Signed percentage move of the spot price caused by a trade
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriceImpact(Ratio);

impl PriceImpact {
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64()
    }
}

impl fmt::Display for PriceImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Price impact of a trade, measured on the curve alone (fee excluded)
pub fn price_impact(
    amount_in: &Amount,
    reserve_in: &Amount,
    reserve_out: &Amount,
) -> Result<PriceImpact, AmmError> {
    let no_liquidity = || AmmError::InsufficientLiquidity("pool has no liquidity".to_string());

    let price_before = reserve_out.checked_div(reserve_in).ok_or_else(no_liquidity)?;
    if price_before.is_zero() {
        return Err(no_liquidity());
    }

    let amount_out = quote_swap(amount_in, reserve_in, reserve_out, 0)?;
    let remaining_out = reserve_out.checked_sub(&amount_out).ok_or_else(no_liquidity)?;
    let price_after = remaining_out
        .checked_div(&(reserve_in + amount_in))
        .ok_or_else(no_liquidity)?;

    price_before
        .percent_drop_to(&price_after)
        .map(PriceImpact)
        .ok_or_else(no_liquidity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::test_support::amount;

    #[test]
    fn test_quote_matches_reference_scenario() {
        let out = quote_swap(&amount("1000"), &amount("100000"), &amount("100000"), 3).unwrap();

        let reference = amount("99700000").checked_div(&amount("100997")).unwrap();
        assert_eq!(out, reference);
        assert_eq!(out.to_string(), "987.15803439706129885");
    }

    #[test]
    fn test_output_never_drains_pool() {
        let reserve = amount("100000");
        for amount_in in ["1", "1000", "1000000", "1000000000000"] {
            let out = quote_swap(&amount(amount_in), &reserve, &reserve, 3).unwrap();
            assert!(out < reserve, "output {} must stay below reserve", out);
        }
    }

    #[test]
    fn test_output_strictly_increases_with_input() {
        let reserve_in = amount("5000");
        let reserve_out = amount("20000");
        let mut previous = Amount::zero();
        for amount_in in ["0.5", "1", "10", "250", "4999"] {
            let out = quote_swap(&amount(amount_in), &reserve_in, &reserve_out, 3).unwrap();
            assert!(out > previous);
            previous = out;
        }
    }

    #[test]
    fn test_higher_fee_gives_lower_output() {
        let amount_in = amount("1000");
        let reserve = amount("100000");
        let mut previous = quote_swap(&amount_in, &reserve, &reserve, 0).unwrap();
        for fee in [1, 3, 10, 100, 999] {
            let out = quote_swap(&amount_in, &reserve, &reserve, fee).unwrap();
            assert!(out < previous, "fee {} should lower output", fee);
            previous = out;
        }
    }

    #[test]
    fn test_fee_is_deducted_before_the_curve() {
        // deducting after the curve would give 990.099009... * 0.997
        let out = quote_swap(&amount("1000"), &amount("100000"), &amount("100000"), 3).unwrap();
        let fee_after_curve = &quote_swap(&amount("1000"), &amount("100000"), &amount("100000"), 0)
            .unwrap()
            * &amount("0.997");
        assert_ne!(out, fee_after_curve);
    }

    #[test]
    fn test_empty_input_side_is_insufficient_liquidity() {
        let err = quote_swap(&Amount::zero(), &Amount::zero(), &amount("10"), 3).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity(_)));
    }

    #[test]
    fn test_fee_of_one_hundred_percent_is_rejected() {
        let err = quote_swap(&amount("1"), &amount("10"), &amount("10"), 1000).unwrap_err();
        assert_eq!(err, AmmError::InvalidFee(1000));
    }

    #[test]
    fn test_price_impact_reflects_curve_only() {
        let impact = price_impact(&amount("1000"), &amount("100000"), &amount("100000")).unwrap();
        // 1 - 100000^2 / 101000^2 = 1.9703950...%
        let pct = impact.as_f64();
        assert!(pct > 1.9703 && pct < 1.9704, "impact was {}", pct);
    }

    #[test]
    fn test_price_impact_grows_with_trade_size() {
        let reserve = amount("100000");
        let small = price_impact(&amount("10"), &reserve, &reserve).unwrap();
        let large = price_impact(&amount("10000"), &reserve, &reserve).unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_price_impact_on_empty_pool_fails() {
        let err = price_impact(&amount("10"), &Amount::zero(), &amount("10")).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity(_)));
    }
}
