//! Swap execution against a pool record

use super::pool_math::{amount_after_fee, price_impact, quote_swap, PriceImpact};
use super::{Pool, Side};
use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, TimestampMs};

/// Result of pricing (and possibly executing) a swap
#[derive(Debug, Clone, PartialEq)]
pub struct SwapOutcome {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fee_amount: Amount,
    pub price_impact: PriceImpact,
}

impl Pool {
    /// Price a swap of `amount_in` of `token_in` without mutating the pool
    pub fn quote(&self, token_in: &str, amount_in: &Amount) -> Result<SwapOutcome, AmmError> {
        if !amount_in.is_positive() {
            return Err(AmmError::InvalidAmount("amount in must be positive".to_string()));
        }

        let side = self.side_of(token_in)?;
        let (reserve_in, reserve_out) = self.reserves_for(token_in)?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity(format!(
                "pool {} has no liquidity",
                self.id
            )));
        }

        let amount_out = quote_swap(amount_in, reserve_in, reserve_out, self.fee)?;
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity(
                "output rounds down to zero".to_string(),
            ));
        }

        let in_after_fee = amount_after_fee(amount_in, self.fee)?;
        let fee_amount = amount_in.checked_sub(&in_after_fee).unwrap_or_default();

        Ok(SwapOutcome {
            token_in: token_in.to_string(),
            token_out: self.counterpart(side).rune_id.clone(),
            amount_in: amount_in.clone(),
            amount_out,
            fee_amount,
            price_impact: price_impact(amount_in, reserve_in, reserve_out)?,
        })
    }

    /// Execute a swap; the full input (fee included) stays in the pool
    pub fn swap(
        &mut self,
        token_in: &str,
        amount_in: &Amount,
        min_amount_out: &Amount,
        now: TimestampMs,
    ) -> Result<SwapOutcome, AmmError> {
        let outcome = self.quote(token_in, amount_in)?;
        if &outcome.amount_out < min_amount_out {
            return Err(AmmError::SlippageExceeded {
                actual: outcome.amount_out.to_string(),
                minimum: min_amount_out.to_string(),
            });
        }

        let side = self.side_of(token_in)?;
        let (reserve_in, reserve_out) = self.reserves_mut(side);
        let drained = reserve_out.checked_sub(&outcome.amount_out).ok_or_else(|| {
            AmmError::InsufficientLiquidity("output exceeds reserve".to_string())
        })?;
        *reserve_in = &*reserve_in + &outcome.amount_in;
        *reserve_out = drained;
        self.last_update = now;

        Ok(outcome)
    }

    /// Undo a swap whose settlement failed
    pub fn revert_swap(&mut self, outcome: &SwapOutcome, now: TimestampMs) -> Result<(), AmmError> {
        let side = self.side_of(&outcome.token_in)?;
        let (reserve_in, reserve_out) = self.reserves_mut(side);
        let restored_in = reserve_in.checked_sub(&outcome.amount_in).ok_or_else(|| {
            AmmError::InsufficientLiquidity("pool no longer holds the swap input".to_string())
        })?;
        *reserve_in = restored_in;
        *reserve_out = &*reserve_out + &outcome.amount_out;
        self.last_update = now;
        Ok(())
    }

    fn reserves_mut(&mut self, side: Side) -> (&mut Amount, &mut Amount) {
        match side {
            Side::A => (&mut self.reserve_a, &mut self.reserve_b),
            Side::B => (&mut self.reserve_b, &mut self.reserve_a),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::pool::test_support::*;
    use crate::shared::errors::AmmError;
    use crate::shared::types::Amount;

    #[test]
    fn test_swap_moves_reserves_and_keeps_fee_in_pool() {
        let mut pool = funded_pool("100000", "100000", "100000", 3);
        let outcome = pool.swap("1", &amount("1000"), &Amount::zero(), 11).unwrap();

        assert_eq!(outcome.token_out, "2");
        assert_eq!(outcome.fee_amount, amount("3"));
        assert_eq!(pool.reserve_a, amount("101000"));
        assert_eq!(
            pool.reserve_b,
            amount("100000").checked_sub(&outcome.amount_out).unwrap()
        );
        assert_eq!(pool.last_update, 11);
    }

    #[test]
    fn test_swap_direction_follows_token_in() {
        let mut pool = funded_pool("1000", "4000", "2000", 3);
        let outcome = pool.swap("2", &amount("400"), &Amount::zero(), 1).unwrap();

        assert_eq!(outcome.token_out, "1");
        assert_eq!(pool.reserve_b, amount("4400"));
        assert!(pool.reserve_a < amount("1000"));
    }

    #[test]
    fn test_constant_product_never_decreases() {
        let mut pool = funded_pool("5000", "7000", "5916", 3);
        let k_before = &pool.reserve_a * &pool.reserve_b;
        pool.swap("1", &amount("777.7"), &Amount::zero(), 1).unwrap();
        pool.swap("2", &amount("12.34"), &Amount::zero(), 2).unwrap();
        assert!(&pool.reserve_a * &pool.reserve_b >= k_before);
    }

    #[test]
    fn test_slippage_guard_leaves_pool_untouched() {
        let mut pool = funded_pool("100000", "100000", "100000", 3);
        let before = pool.clone();

        let err = pool.swap("1", &amount("1000"), &amount("990"), 1).unwrap_err();

        assert!(matches!(err, AmmError::SlippageExceeded { .. }));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_swap_on_unfunded_pool_fails() {
        let mut pool = funded_pool("0", "0", "0", 3);
        let err = pool.swap("1", &amount("1"), &Amount::zero(), 1).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity(_)));
    }

    #[test]
    fn test_swap_rejects_zero_input_and_foreign_token() {
        let mut pool = funded_pool("100", "100", "100", 3);
        assert!(matches!(
            pool.swap("1", &Amount::zero(), &Amount::zero(), 1),
            Err(AmmError::InvalidAmount(_))
        ));
        assert!(matches!(
            pool.swap("9", &amount("1"), &Amount::zero(), 1),
            Err(AmmError::PoolNotFound(_))
        ));
    }

    #[test]
    fn test_revert_swap_restores_reserves() {
        let mut pool = funded_pool("100000", "100000", "100000", 3);
        let before = pool.clone();
        let outcome = pool.swap("2", &amount("2500"), &Amount::zero(), 1).unwrap();

        pool.revert_swap(&outcome, 0).unwrap();
        assert_eq!(pool, before);
    }
}
