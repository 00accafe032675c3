//! Reward accrual and stake accounting

use tracing::debug;

use super::{Farm, StakerPosition};
use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, BlockHeight};

/// Effect of a stake or unstake on one position, kept so it can be undone
#[derive(Debug, Clone, PartialEq)]
pub struct StakeChange {
    pub amount: Amount,
    /// Reward harvested by the operation
    pub reward: Amount,
    pub debt_before: Amount,
    pub debt_after: Amount,
}

impl Farm {
    /// Bring `acc_reward_per_share` up to `current_block`.
    ///
    /// Accrual stops at `end_block`. With nothing staked the accumulator is
    /// left alone but `last_reward_block` still advances, so an idle period
    /// is never paid out to whoever stakes next. Returns whether any state
    /// changed.
    pub fn update_rewards(&mut self, current_block: BlockHeight) -> bool {
        let target = current_block.min(self.end_block);
        if target <= self.last_reward_block {
            return false;
        }

        if !self.total_staked.is_zero() {
            let elapsed = Amount::from(target - self.last_reward_block);
            let emitted = &elapsed * &self.reward_per_block;
            if let Some(per_share) = emitted.checked_div(&self.total_staked) {
                self.acc_reward_per_share = &self.acc_reward_per_share + &per_share;
            }
        }

        debug!(
            farm = %self.id,
            from = self.last_reward_block,
            to = target,
            acc = %self.acc_reward_per_share,
            "accrued farm rewards"
        );
        self.last_reward_block = target;
        true
    }

    /// Reward owed to `position` at the current accumulator
    fn accrued(&self, position: &StakerPosition) -> Amount {
        (&position.amount * &self.acc_reward_per_share)
            .checked_sub(&position.reward_debt)
            .unwrap_or_default()
    }

    /// What a harvest at `current_block` would pay, without mutating anything
    pub fn pending_reward(&self, position: &StakerPosition, current_block: BlockHeight) -> Amount {
        let mut projected = self.clone();
        projected.update_rewards(current_block);
        projected.accrued(position)
    }

    /// Stake `amount`, harvesting whatever the position had accrued
    pub fn stake(
        &mut self,
        position: &mut StakerPosition,
        amount: &Amount,
        current_block: BlockHeight,
    ) -> Result<StakeChange, AmmError> {
        if !amount.is_positive() {
            return Err(AmmError::InvalidAmount("stake amount must be positive".to_string()));
        }

        self.update_rewards(current_block);
        let reward = self.accrued(position);
        let debt_before = position.reward_debt.clone();

        self.total_staked = &self.total_staked + amount;
        position.amount = &position.amount + amount;
        position.reward_debt = &position.amount * &self.acc_reward_per_share;

        Ok(StakeChange {
            amount: amount.clone(),
            reward,
            debt_before,
            debt_after: position.reward_debt.clone(),
        })
    }

    /// Withdraw `amount` from the position, harvesting its accrued reward
    pub fn unstake(
        &mut self,
        position: &mut StakerPosition,
        amount: &Amount,
        current_block: BlockHeight,
    ) -> Result<StakeChange, AmmError> {
        if !amount.is_positive() {
            return Err(AmmError::InvalidAmount("unstake amount must be positive".to_string()));
        }
        let insufficient = || AmmError::InsufficientStake {
            requested: amount.to_string(),
            staked: position.amount.to_string(),
        };
        let remaining = position.amount.checked_sub(amount).ok_or_else(insufficient)?;
        let total_remaining = self.total_staked.checked_sub(amount).ok_or_else(insufficient)?;

        self.update_rewards(current_block);
        let reward = self.accrued(position);
        let debt_before = position.reward_debt.clone();

        self.total_staked = total_remaining;
        position.amount = remaining;
        position.reward_debt = &position.amount * &self.acc_reward_per_share;

        Ok(StakeChange {
            amount: amount.clone(),
            reward,
            debt_before,
            debt_after: position.reward_debt.clone(),
        })
    }

    /// Undo a stake whose settlement failed. The accumulator is not rolled back.
    pub fn revert_stake(
        &mut self,
        position: &mut StakerPosition,
        change: &StakeChange,
    ) -> Result<(), AmmError> {
        let total = self.total_staked.checked_sub(&change.amount);
        let amount = position.amount.checked_sub(&change.amount);
        let debt = restore_debt(position, change);
        let (Some(total), Some(amount), Some(debt)) = (total, amount, debt) else {
            return Err(AmmError::InsufficientStake {
                requested: change.amount.to_string(),
                staked: position.amount.to_string(),
            });
        };

        self.total_staked = total;
        position.amount = amount;
        position.reward_debt = debt;
        Ok(())
    }

    /// Undo an unstake whose settlement failed. The accumulator is not rolled back.
    pub fn revert_unstake(
        &mut self,
        position: &mut StakerPosition,
        change: &StakeChange,
    ) -> Result<(), AmmError> {
        let debt = restore_debt(position, change).ok_or_else(|| AmmError::InsufficientStake {
            requested: change.amount.to_string(),
            staked: position.amount.to_string(),
        })?;

        self.total_staked = &self.total_staked + &change.amount;
        position.amount = &position.amount + &change.amount;
        position.reward_debt = debt;
        Ok(())
    }
}

/// `debt - debt_after + debt_before`, kept non-negative
fn restore_debt(position: &StakerPosition, change: &StakeChange) -> Option<Amount> {
    (&position.reward_debt + &change.debt_before).checked_sub(&change.debt_after)
}

#[cfg(test)]
mod tests {
    use crate::domain::farm::test_support::farm;
    use crate::domain::farm::StakerPosition;
    use crate::shared::errors::AmmError;
    use crate::shared::types::Amount;

    fn amount(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_idle_farm_advances_without_accruing() {
        let mut farm = farm(10, 100, 1_000);

        assert!(farm.update_rewards(150));
        assert!(farm.acc_reward_per_share.is_zero());
        assert_eq!(farm.last_reward_block, 150);

        assert!(farm.update_rewards(900));
        assert!(farm.acc_reward_per_share.is_zero());
        assert_eq!(farm.last_reward_block, 900);
    }

    #[test]
    fn test_update_is_idempotent_for_the_same_block() {
        let mut farm = farm(10, 100, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 100).unwrap();

        assert!(farm.update_rewards(110));
        let after_first = farm.clone();

        assert!(!farm.update_rewards(110));
        assert_eq!(farm, after_first);
    }

    #[test]
    fn test_update_never_moves_backwards() {
        let mut farm = farm(10, 100, 1_000);
        farm.update_rewards(500);
        assert!(!farm.update_rewards(200));
        assert_eq!(farm.last_reward_block, 500);
    }

    #[test]
    fn test_accrual_per_share() {
        let mut farm = farm(10, 100, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 100).unwrap();

        farm.update_rewards(110);
        // 10 blocks * 10 per block / 100 staked
        assert_eq!(farm.acc_reward_per_share, amount("1"));
        assert_eq!(farm.pending_reward(&position, 110), amount("100"));
    }

    #[test]
    fn test_accrual_stops_at_end_block() {
        let mut farm = farm(10, 100, 120);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("50"), 100).unwrap();

        farm.update_rewards(10_000);
        assert_eq!(farm.last_reward_block, 120);
        assert_eq!(farm.pending_reward(&position, 20_000), amount("200"));
    }

    #[test]
    fn test_stake_before_start_accrues_from_start() {
        let mut farm = farm(10, 100, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("10"), 50).unwrap();
        assert_eq!(farm.last_reward_block, 100);

        assert_eq!(farm.pending_reward(&position, 105), amount("50"));
    }

    #[test]
    fn test_rewards_split_between_stakers() {
        let mut farm = farm(30, 0, 1_000);
        let mut alice = StakerPosition::default();
        let mut bob = StakerPosition::default();

        farm.stake(&mut alice, &amount("100"), 0).unwrap();
        // alice alone for 10 blocks: 300
        farm.stake(&mut bob, &amount("200"), 10).unwrap();
        // then 1/3 vs 2/3 of 30 per block for 10 blocks

        assert_eq!(farm.pending_reward(&alice, 20), amount("400"));
        assert_eq!(farm.pending_reward(&bob, 20), amount("200"));
    }

    #[test]
    fn test_stake_harvests_pending_reward() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 0).unwrap();

        let change = farm.stake(&mut position, &amount("100"), 10).unwrap();
        assert_eq!(change.reward, amount("100"));
        assert_eq!(position.amount, amount("200"));
        assert_eq!(farm.total_staked, amount("200"));
        assert!(farm.pending_reward(&position, 10).is_zero());
    }

    #[test]
    fn test_unstake_returns_reward_and_reduces_stake() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 0).unwrap();

        let change = farm.unstake(&mut position, &amount("40"), 5).unwrap();
        assert_eq!(change.reward, amount("50"));
        assert_eq!(position.amount, amount("60"));
        assert_eq!(farm.total_staked, amount("60"));
    }

    #[test]
    fn test_unstake_more_than_staked_fails() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 0).unwrap();
        let before = farm.clone();

        let err = farm.unstake(&mut position, &amount("100.01"), 5).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientStake { .. }));
        assert_eq!(farm, before);
    }

    #[test]
    fn test_non_positive_amounts_are_invalid() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        assert!(matches!(
            farm.stake(&mut position, &Amount::zero(), 1),
            Err(AmmError::InvalidAmount(_))
        ));
        assert!(matches!(
            farm.unstake(&mut position, &Amount::zero(), 1),
            Err(AmmError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_accumulator_is_monotonic_across_operations() {
        let mut farm = farm(7, 0, 1_000);
        let mut position = StakerPosition::default();
        let mut last = Amount::zero();

        for (block, stake) in [(0, "3"), (4, "11"), (9, "0.5"), (15, "20")] {
            farm.stake(&mut position, &amount(stake), block).unwrap();
            assert!(farm.acc_reward_per_share >= last);
            last = farm.acc_reward_per_share.clone();
        }
        farm.unstake(&mut position, &amount("30"), 40).unwrap();
        assert!(farm.acc_reward_per_share >= last);
    }

    #[test]
    fn test_revert_stake_restores_position_and_reward() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 0).unwrap();
        let position_before = position.clone();

        let change = farm.stake(&mut position, &amount("50"), 10).unwrap();
        farm.revert_stake(&mut position, &change).unwrap();

        assert_eq!(position, position_before);
        assert_eq!(farm.total_staked, amount("100"));
        assert_eq!(farm.pending_reward(&position, 10), amount("100"));
    }

    #[test]
    fn test_revert_unstake_restores_position() {
        let mut farm = farm(10, 0, 1_000);
        let mut position = StakerPosition::default();
        farm.stake(&mut position, &amount("100"), 0).unwrap();
        let position_before = position.clone();

        let change = farm.unstake(&mut position, &amount("100"), 10).unwrap();
        farm.revert_unstake(&mut position, &change).unwrap();

        assert_eq!(position, position_before);
        assert_eq!(farm.total_staked, amount("100"));
    }
}
