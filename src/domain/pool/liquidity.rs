//! Liquidity mint/burn accounting

use super::Pool;
use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, TimestampMs};

const BPS_SCALE: i64 = 4;

impl Pool {
    /// Deposit `amount_a` / `amount_b` and mint liquidity shares.
    ///
    /// An empty pool mints `sqrt(a * b)` and takes the deposit as its
    /// initial price. A funded pool requires `amount_b` to be within
    /// `tolerance_bps` of `amount_a * reserve_b / reserve_a` and mints the
    /// smaller of the two proportional shares, so depositors cannot dilute
    /// existing holders.
    pub fn add_liquidity(
        &mut self,
        amount_a: &Amount,
        amount_b: &Amount,
        min_liquidity: &Amount,
        tolerance_bps: u32,
        now: TimestampMs,
    ) -> Result<Amount, AmmError> {
        if !amount_a.is_positive() || !amount_b.is_positive() {
            return Err(AmmError::InvalidAmount(
                "both deposit amounts must be positive".to_string(),
            ));
        }

        let minted = if self.is_empty() {
            (amount_a * amount_b).sqrt().ok_or_else(|| {
                AmmError::InvalidAmount("deposit is out of range".to_string())
            })?
        } else {
            self.proportional_mint(amount_a, amount_b, tolerance_bps)?
        };

        if minted.is_zero() {
            return Err(AmmError::InsufficientLiquidity(
                "deposit too small to mint liquidity".to_string(),
            ));
        }
        if &minted < min_liquidity {
            return Err(AmmError::SlippageExceeded {
                actual: minted.to_string(),
                minimum: min_liquidity.to_string(),
            });
        }

        self.reserve_a = &self.reserve_a + amount_a;
        self.reserve_b = &self.reserve_b + amount_b;
        self.total_supply = &self.total_supply + &minted;
        self.last_update = now;

        Ok(minted)
    }

    fn proportional_mint(
        &self,
        amount_a: &Amount,
        amount_b: &Amount,
        tolerance_bps: u32,
    ) -> Result<Amount, AmmError> {
        let unfunded =
            || AmmError::InsufficientLiquidity(format!("pool {} has supply but no reserves", self.id));

        let expected_b = (amount_a * &self.reserve_b)
            .checked_div(&self.reserve_a)
            .ok_or_else(unfunded)?;
        let allowed = &expected_b * &Amount::from_scaled(u64::from(tolerance_bps), BPS_SCALE);
        if amount_b.abs_diff(&expected_b) > allowed {
            return Err(AmmError::RatioOutOfTolerance {
                expected: expected_b.to_string(),
                actual: amount_b.to_string(),
            });
        }

        let share_a = (amount_a * &self.total_supply)
            .checked_div(&self.reserve_a)
            .ok_or_else(unfunded)?;
        let share_b = (amount_b * &self.total_supply)
            .checked_div(&self.reserve_b)
            .ok_or_else(unfunded)?;

        Ok(share_a.min(share_b))
    }

    /// Amounts redeemed by burning `liquidity`, without touching the pool
    pub fn redemption_for(&self, liquidity: &Amount) -> Result<(Amount, Amount), AmmError> {
        if !liquidity.is_positive() {
            return Err(AmmError::InvalidAmount(
                "liquidity to burn must be positive".to_string(),
            ));
        }
        if liquidity > &self.total_supply {
            return Err(AmmError::InsufficientLiquidity(format!(
                "burning {} exceeds total supply {}",
                liquidity, self.total_supply
            )));
        }

        // burning everything returns the reserves exactly, with no truncation dust
        if liquidity == &self.total_supply {
            return Ok((self.reserve_a.clone(), self.reserve_b.clone()));
        }

        let no_supply = || AmmError::InsufficientLiquidity("pool has no supply".to_string());
        let amount_a = (liquidity * &self.reserve_a)
            .checked_div(&self.total_supply)
            .ok_or_else(no_supply)?;
        let amount_b = (liquidity * &self.reserve_b)
            .checked_div(&self.total_supply)
            .ok_or_else(no_supply)?;

        Ok((amount_a, amount_b))
    }

    /// Burn `liquidity` and pay out the proportional share of both reserves
    pub fn remove_liquidity(
        &mut self,
        liquidity: &Amount,
        min_amount_a: &Amount,
        min_amount_b: &Amount,
        now: TimestampMs,
    ) -> Result<(Amount, Amount), AmmError> {
        let (amount_a, amount_b) = self.redemption_for(liquidity)?;

        if &amount_a < min_amount_a {
            return Err(AmmError::SlippageExceeded {
                actual: amount_a.to_string(),
                minimum: min_amount_a.to_string(),
            });
        }
        if &amount_b < min_amount_b {
            return Err(AmmError::SlippageExceeded {
                actual: amount_b.to_string(),
                minimum: min_amount_b.to_string(),
            });
        }

        let reserve_a = self.reserve_a.checked_sub(&amount_a);
        let reserve_b = self.reserve_b.checked_sub(&amount_b);
        let supply = self.total_supply.checked_sub(liquidity);
        let (Some(reserve_a), Some(reserve_b), Some(supply)) = (reserve_a, reserve_b, supply) else {
            return Err(AmmError::InsufficientLiquidity(
                "redemption exceeds reserves".to_string(),
            ));
        };

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_supply = supply;
        self.last_update = now;

        Ok((amount_a, amount_b))
    }

    /// Undo a deposit whose settlement failed
    pub fn revert_add_liquidity(
        &mut self,
        amount_a: &Amount,
        amount_b: &Amount,
        liquidity: &Amount,
        now: TimestampMs,
    ) -> Result<(), AmmError> {
        let reserve_a = self.reserve_a.checked_sub(amount_a);
        let reserve_b = self.reserve_b.checked_sub(amount_b);
        let supply = self.total_supply.checked_sub(liquidity);
        let (Some(reserve_a), Some(reserve_b), Some(supply)) = (reserve_a, reserve_b, supply) else {
            return Err(AmmError::InsufficientLiquidity(format!(
                "pool {} no longer holds the deposit being rolled back",
                self.id
            )));
        };

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_supply = supply;
        self.last_update = now;
        Ok(())
    }

    /// Undo a withdrawal whose settlement failed
    pub fn revert_remove_liquidity(
        &mut self,
        amount_a: &Amount,
        amount_b: &Amount,
        liquidity: &Amount,
        now: TimestampMs,
    ) {
        self.reserve_a = &self.reserve_a + amount_a;
        self.reserve_b = &self.reserve_b + amount_b;
        self.total_supply = &self.total_supply + liquidity;
        self.last_update = now;
    }
}
