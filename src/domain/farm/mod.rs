//! Farm domain - staking and reward-per-share accrual

mod rewards;

pub use rewards::StakeChange;

use serde::{Deserialize, Serialize};

use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, BlockHeight, RuneToken};
use crate::shared::utils::{validate_rune_id, ID_SEPARATOR};

/// Lifecycle of a farm relative to a block height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FarmStatus {
    Pending,
    Active,
    Ended,
}

impl FarmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmStatus::Pending => "pending",
            FarmStatus::Active => "active",
            FarmStatus::Ended => "ended",
        }
    }
}

/// Yield farm record.
///
/// `acc_reward_per_share` is the reward accumulated by one staked unit since
/// the farm started; it never decreases and `last_reward_block` never moves
/// backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub token: RuneToken,
    pub reward_token: RuneToken,
    pub total_staked: Amount,
    pub reward_per_block: Amount,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
    pub last_reward_block: BlockHeight,
    pub acc_reward_per_share: Amount,
}

impl Farm {
    pub fn new(
        token: RuneToken,
        reward_token: RuneToken,
        reward_per_block: Amount,
        start_block: BlockHeight,
        end_block: BlockHeight,
    ) -> Result<Self, AmmError> {
        Self::check(&token, &reward_token, start_block, end_block)?;

        Ok(Self {
            id: Self::farm_id(&token.rune_id, &reward_token.rune_id),
            token,
            reward_token,
            total_staked: Amount::zero(),
            reward_per_block,
            start_block,
            end_block,
            last_reward_block: start_block,
            acc_reward_per_share: Amount::zero(),
        })
    }

    /// Re-check a record loaded from storage
    pub fn revalidated(mut self) -> Result<Self, AmmError> {
        Self::check(&self.token, &self.reward_token, self.start_block, self.end_block)?;
        self.id = Self::farm_id(&self.token.rune_id, &self.reward_token.rune_id);
        Ok(self)
    }

    fn check(
        token: &RuneToken,
        reward_token: &RuneToken,
        start_block: BlockHeight,
        end_block: BlockHeight,
    ) -> Result<(), AmmError> {
        validate_rune_id(&token.rune_id)?;
        validate_rune_id(&reward_token.rune_id)?;
        if end_block <= start_block {
            return Err(AmmError::InvalidFarmSchedule {
                start: start_block,
                end: end_block,
            });
        }
        Ok(())
    }

    /// Farms are keyed by staking token then reward token; the order matters
    pub fn farm_id(token: &str, reward_token: &str) -> String {
        format!("{}{}{}", token, ID_SEPARATOR, reward_token)
    }

    pub fn status(&self, block: BlockHeight) -> FarmStatus {
        if block < self.start_block {
            FarmStatus::Pending
        } else if block < self.end_block {
            FarmStatus::Active
        } else {
            FarmStatus::Ended
        }
    }
}

/// Per-staker bookkeeping kept next to the farm record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakerPosition {
    pub amount: Amount,
    /// `amount * acc_reward_per_share` at the last harvest
    pub reward_debt: Amount,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::pool::test_support::token;

    pub fn farm(reward_per_block: u64, start: BlockHeight, end: BlockHeight) -> Farm {
        Farm::new(
            token("1", "STK"),
            token("2", "RWD"),
            Amount::from(reward_per_block),
            start,
            end,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::farm;
    use super::*;
    use crate::domain::pool::test_support::token;

    #[test]
    fn test_status_follows_block_height() {
        let farm = farm(10, 100, 200);
        assert_eq!(farm.status(99), FarmStatus::Pending);
        assert_eq!(farm.status(100), FarmStatus::Active);
        assert_eq!(farm.status(199), FarmStatus::Active);
        assert_eq!(farm.status(200), FarmStatus::Ended);
    }

    #[test]
    fn test_new_farm_starts_accruing_at_start_block() {
        let farm = farm(10, 100, 200);
        assert_eq!(farm.id, "1-2");
        assert_eq!(farm.last_reward_block, 100);
        assert!(farm.acc_reward_per_share.is_zero());
        assert!(farm.total_staked.is_zero());
    }

    #[test]
    fn test_schedule_must_move_forward() {
        let err = Farm::new(token("1", "A"), token("2", "B"), Amount::from(1u64), 50, 50)
            .unwrap_err();
        assert_eq!(err, AmmError::InvalidFarmSchedule { start: 50, end: 50 });
    }

    #[test]
    fn test_rune_ids_with_separator_are_rejected() {
        let err = Farm::new(token("a-b", "AB"), token("c", "C"), Amount::from(1u64), 0, 10)
            .unwrap_err();
        assert_eq!(err, AmmError::InvalidRuneId("a-b".to_string()));
        let err = Farm::new(token("a", "A"), token("b-c", "BC"), Amount::from(1u64), 0, 10)
            .unwrap_err();
        assert_eq!(err, AmmError::InvalidRuneId("b-c".to_string()));
    }

    #[test]
    fn test_farm_id_is_ordered() {
        assert_ne!(Farm::farm_id("A", "B"), Farm::farm_id("B", "A"));
    }
}
