//! Registry records: a pool or farm together with its owners' positions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::farm::{Farm, StakeChange, StakerPosition};
use crate::domain::pool::Pool;
use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, BlockHeight, TimestampMs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolAccount {
    pub pool: Pool,
    /// Liquidity held per owner; sums to `pool.total_supply`
    #[serde(default)]
    pub providers: BTreeMap<String, Amount>,
    /// Liquidity minted by deposits still waiting on submission
    #[serde(skip)]
    unsettled: BTreeMap<String, Amount>,
}

impl PoolAccount {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            providers: BTreeMap::new(),
            unsettled: BTreeMap::new(),
        }
    }

    pub fn liquidity_of(&self, owner: &str) -> Amount {
        self.providers.get(owner).cloned().unwrap_or_default()
    }

    /// Liquidity the owner may burn now; unsettled deposits are excluded
    pub fn burnable(&self, owner: &str) -> Amount {
        let held = self.unsettled.get(owner).cloned().unwrap_or_default();
        self.liquidity_of(owner)
            .checked_sub(&held)
            .unwrap_or_default()
    }

    /// Mark freshly minted liquidity as unsettled until `release` is called
    pub fn hold(&mut self, owner: &str, liquidity: &Amount) {
        let held = self.unsettled.get(owner).cloned().unwrap_or_default();
        self.unsettled.insert(owner.to_string(), &held + liquidity);
    }

    pub fn release(&mut self, owner: &str, liquidity: &Amount) {
        let held = self.unsettled.get(owner).cloned().unwrap_or_default();
        match held.checked_sub(liquidity) {
            Some(remaining) if remaining.is_positive() => {
                self.unsettled.insert(owner.to_string(), remaining);
            }
            _ => {
                self.unsettled.remove(owner);
            }
        }
    }

    /// Undo a deposit whose submission failed. Either the reserves, the
    /// supply and the owner's position all go back, or nothing changes.
    pub fn revert_deposit(
        &mut self,
        owner: &str,
        amount_a: &Amount,
        amount_b: &Amount,
        liquidity: &Amount,
        now: TimestampMs,
    ) -> Result<(), AmmError> {
        self.release(owner, liquidity);
        if self.liquidity_of(owner) < *liquidity {
            return Err(AmmError::InsufficientLiquidity(format!(
                "{} holds {} liquidity in {}, cannot return deposit of {}",
                owner,
                self.liquidity_of(owner),
                self.pool.id,
                liquidity
            )));
        }

        self.pool
            .revert_add_liquidity(amount_a, amount_b, liquidity, now)?;
        self.debit(owner, liquidity)
    }

    pub fn credit(&mut self, owner: &str, liquidity: &Amount) {
        let held = self.liquidity_of(owner);
        self.providers.insert(owner.to_string(), &held + liquidity);
    }

    /// Take `liquidity` away from `owner`; an emptied position is dropped
    pub fn debit(&mut self, owner: &str, liquidity: &Amount) -> Result<(), AmmError> {
        let held = self.liquidity_of(owner);
        let remaining = held.checked_sub(liquidity).ok_or_else(|| {
            AmmError::InsufficientLiquidity(format!(
                "{} holds {} liquidity in {}, cannot burn {}",
                owner, held, self.pool.id, liquidity
            ))
        })?;

        if remaining.is_zero() {
            self.providers.remove(owner);
        } else {
            self.providers.insert(owner.to_string(), remaining);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmAccount {
    pub farm: Farm,
    #[serde(default)]
    pub stakers: BTreeMap<String, StakerPosition>,
}

impl FarmAccount {
    pub fn new(farm: Farm) -> Self {
        Self {
            farm,
            stakers: BTreeMap::new(),
        }
    }

    pub fn position(&self, owner: &str) -> StakerPosition {
        self.stakers.get(owner).cloned().unwrap_or_default()
    }

    pub fn pending_reward(&self, owner: &str, block: BlockHeight) -> Amount {
        self.farm.pending_reward(&self.position(owner), block)
    }

    pub fn stake(
        &mut self,
        owner: &str,
        amount: &Amount,
        block: BlockHeight,
    ) -> Result<StakeChange, AmmError> {
        let mut position = self.position(owner);
        let change = self.farm.stake(&mut position, amount, block)?;
        self.store(owner, position);
        Ok(change)
    }

    pub fn unstake(
        &mut self,
        owner: &str,
        amount: &Amount,
        block: BlockHeight,
    ) -> Result<StakeChange, AmmError> {
        let mut position = self.position(owner);
        let change = self.farm.unstake(&mut position, amount, block)?;
        self.store(owner, position);
        Ok(change)
    }

    pub fn revert_stake(&mut self, owner: &str, change: &StakeChange) -> Result<(), AmmError> {
        let mut position = self.position(owner);
        self.farm.revert_stake(&mut position, change)?;
        self.store(owner, position);
        Ok(())
    }

    pub fn revert_unstake(&mut self, owner: &str, change: &StakeChange) -> Result<(), AmmError> {
        let mut position = self.position(owner);
        self.farm.revert_unstake(&mut position, change)?;
        self.store(owner, position);
        Ok(())
    }

    fn store(&mut self, owner: &str, position: StakerPosition) {
        if position.amount.is_zero() && position.reward_debt.is_zero() {
            self.stakers.remove(owner);
        } else {
            self.stakers.insert(owner.to_string(), position);
        }
    }
}
