//! Pool domain - constant-product liquidity pools

mod liquidity;
mod pool_math;
mod swap;

pub use pool_math::{price_impact, quote_swap, PriceImpact, FEE_DENOMINATOR};
pub use swap::SwapOutcome;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, RuneToken, TimestampMs};
use crate::shared::utils::{validate_rune_id, ID_SEPARATOR};

/// Order-independent identity of a token pair.
///
/// The two rune ids are stored sorted, so `A-B` and `B-A` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    first: String,
    second: String,
}

impl PoolKey {
    pub fn new(token_x: &str, token_y: &str) -> Result<Self, AmmError> {
        validate_rune_id(token_x)?;
        validate_rune_id(token_y)?;
        if token_x == token_y {
            return Err(AmmError::IdenticalTokens(token_x.to_string()));
        }
        Ok(Self::sorted(token_x, token_y))
    }

    fn sorted(token_x: &str, token_y: &str) -> Self {
        let (first, second) = if token_x < token_y {
            (token_x, token_y)
        } else {
            (token_y, token_x)
        };

        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, ID_SEPARATOR, self.second)
    }
}

impl FromStr for PoolKey {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(ID_SEPARATOR)
            .ok_or_else(|| AmmError::PoolNotFound(s.to_string()))?;
        PoolKey::new(x, y)
    }
}

/// Which side of the pool a token sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Constant-product pool record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    pub token_a: RuneToken,
    pub token_b: RuneToken,
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub total_supply: Amount,
    /// Tenths of a percent (3 = 0.3%)
    pub fee: u32,
    pub last_update: TimestampMs,
}

impl Pool {
    /// Create an empty pool; tokens are stored in canonical order
    pub fn new(
        token_x: RuneToken,
        token_y: RuneToken,
        fee: u32,
        now: TimestampMs,
    ) -> Result<Self, AmmError> {
        if fee >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee(fee));
        }

        let key = PoolKey::new(&token_x.rune_id, &token_y.rune_id)?;
        let (token_a, token_b) = if token_x.rune_id == key.first {
            (token_x, token_y)
        } else {
            (token_y, token_x)
        };

        Ok(Self {
            id: key.to_string(),
            token_a,
            token_b,
            reserve_a: Amount::zero(),
            reserve_b: Amount::zero(),
            total_supply: Amount::zero(),
            fee,
            last_update: now,
        })
    }

    pub fn key(&self) -> PoolKey {
        PoolKey::sorted(&self.token_a.rune_id, &self.token_b.rune_id)
    }

    /// Re-check a record loaded from storage, putting its tokens and
    /// reserves back in canonical order
    pub fn revalidated(mut self) -> Result<Self, AmmError> {
        if self.fee >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee(self.fee));
        }

        let key = PoolKey::new(&self.token_a.rune_id, &self.token_b.rune_id)?;
        if self.token_a.rune_id != key.first {
            std::mem::swap(&mut self.token_a, &mut self.token_b);
            std::mem::swap(&mut self.reserve_a, &mut self.reserve_b);
        }
        self.id = key.to_string();
        Ok(self)
    }

    /// No liquidity has been minted yet (or all of it was burned)
    pub fn is_empty(&self) -> bool {
        self.total_supply.is_zero()
    }

    pub fn side_of(&self, rune_id: &str) -> Result<Side, AmmError> {
        if rune_id == self.token_a.rune_id {
            Ok(Side::A)
        } else if rune_id == self.token_b.rune_id {
            Ok(Side::B)
        } else {
            Err(AmmError::PoolNotFound(format!("{} has no token {}", self.id, rune_id)))
        }
    }

    /// Reserves as (input, output) when selling `token_in`
    pub fn reserves_for(&self, token_in: &str) -> Result<(&Amount, &Amount), AmmError> {
        Ok(match self.side_of(token_in)? {
            Side::A => (&self.reserve_a, &self.reserve_b),
            Side::B => (&self.reserve_b, &self.reserve_a),
        })
    }

    pub(crate) fn counterpart(&self, side: Side) -> &RuneToken {
        match side {
            Side::A => &self.token_b,
            Side::B => &self.token_a,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn token(rune_id: &str, symbol: &str) -> RuneToken {
        RuneToken {
            rune_id: rune_id.to_string(),
            name: format!("Test Token {}", symbol),
            symbol: symbol.to_string(),
            decimals: 8,
            total_supply: Amount::from(1_000_000u64),
            creator: format!("test-address-{}", rune_id),
            timestamp: 0,
        }
    }

    pub fn amount(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    /// Pool seeded with reserves and supply directly, skipping the bootstrap mint
    pub fn funded_pool(reserve_a: &str, reserve_b: &str, supply: &str, fee: u32) -> Pool {
        let mut pool = Pool::new(token("1", "TTA"), token("2", "TTB"), fee, 0).unwrap();
        pool.reserve_a = amount(reserve_a);
        pool.reserve_b = amount(reserve_b);
        pool.total_supply = amount(supply);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_pool_key_is_order_independent() {
        let ab = PoolKey::new("A", "B").unwrap();
        let ba = PoolKey::new("B", "A").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ba.to_string(), "A-B");
        assert_eq!("B-A".parse::<PoolKey>().unwrap(), ab);
    }

    #[test]
    fn test_pool_key_rejects_identical_tokens() {
        assert_eq!(
            PoolKey::new("1", "1"),
            Err(AmmError::IdenticalTokens("1".to_string()))
        );
        assert!(matches!("12".parse::<PoolKey>(), Err(AmmError::PoolNotFound(_))));
    }

    #[test]
    fn test_ids_with_separator_cannot_collide() {
        let err = Pool::new(token("a-b", "AB"), token("c", "C"), 3, 0).unwrap_err();
        assert_eq!(err, AmmError::InvalidRuneId("a-b".to_string()));
        let err = Pool::new(token("a", "A"), token("b-c", "BC"), 3, 0).unwrap_err();
        assert_eq!(err, AmmError::InvalidRuneId("b-c".to_string()));

        assert_eq!(
            "a-b-c".parse::<PoolKey>(),
            Err(AmmError::InvalidRuneId("b-c".to_string()))
        );
    }

    #[test]
    fn test_new_pool_orders_tokens_canonically() {
        let pool = Pool::new(token("840000:3", "B"), token("840000:1", "A"), 3, 42).unwrap();
        assert_eq!(pool.id, "840000:1-840000:3");
        assert_eq!(pool.token_a.symbol, "A");
        assert_eq!(pool.token_b.symbol, "B");
        assert!(pool.is_empty());
        assert_eq!(pool.last_update, 42);
    }

    #[test]
    fn test_new_pool_rejects_fee_out_of_range() {
        let err = Pool::new(token("1", "A"), token("2", "B"), 1000, 0).unwrap_err();
        assert_eq!(err, AmmError::InvalidFee(1000));
    }

    #[test]
    fn test_revalidated_restores_canonical_order() {
        let mut pool = funded_pool("100", "200", "10", 3);
        std::mem::swap(&mut pool.token_a, &mut pool.token_b);
        std::mem::swap(&mut pool.reserve_a, &mut pool.reserve_b);
        pool.id = "2-1".to_string();

        let pool = pool.revalidated().unwrap();
        assert_eq!(pool, funded_pool("100", "200", "10", 3));
        assert_eq!(pool.key(), PoolKey::new("1", "2").unwrap());

        let mut bad_fee = funded_pool("1", "1", "1", 3);
        bad_fee.fee = 1000;
        assert_eq!(bad_fee.revalidated(), Err(AmmError::InvalidFee(1000)));
    }

    #[test]
    fn test_reserves_follow_input_token() {
        let pool = funded_pool("100", "200", "10", 3);
        let (r_in, r_out) = pool.reserves_for("2").unwrap();
        assert_eq!(r_in, &amount("200"));
        assert_eq!(r_out, &amount("100"));
        assert!(pool.reserves_for("3").is_err());
    }
}
