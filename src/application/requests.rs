//! Inputs and results of the service use cases

use crate::domain::execution::SubmissionReceipt;
use crate::domain::farm::{Farm, FarmStatus};
use crate::domain::pool::SwapOutcome;
use crate::shared::types::{Amount, BlockHeight, RuneToken, TimestampMs};

#[derive(Debug, Clone)]
pub struct CreatePool {
    pub token_a: RuneToken,
    pub token_b: RuneToken,
    /// Falls back to `pools.default_fee`
    pub fee: Option<u32>,
}

/// Deposit into the pool for `token_a`/`token_b`; the pair may be given in either order
#[derive(Debug, Clone)]
pub struct AddLiquidity {
    pub owner: String,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub min_liquidity: Amount,
    /// Falls back to `pools.ratio_tolerance_bps`
    pub tolerance_bps: Option<u32>,
    pub deadline: TimestampMs,
}

#[derive(Debug, Clone)]
pub struct RemoveLiquidity {
    pub owner: String,
    pub pool_id: String,
    pub liquidity: Amount,
    pub min_amount_a: Amount,
    pub min_amount_b: Amount,
    pub deadline: TimestampMs,
}

/// Liquidity change, amounts in the pool's canonical token order
#[derive(Debug, Clone)]
pub struct LiquidityReceipt {
    pub pool_id: String,
    pub liquidity: Amount,
    pub amount_a: Amount,
    pub amount_b: Amount,
    /// Liquidity the owner holds afterwards
    pub balance: Amount,
    pub submission: SubmissionReceipt,
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Amount,
    pub min_amount_out: Amount,
    /// Informational; `min_amount_out` is what gets enforced
    pub slippage: Option<f64>,
    pub deadline: TimestampMs,
}

#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub pool_id: String,
    pub outcome: SwapOutcome,
    pub submission: SubmissionReceipt,
}

#[derive(Debug, Clone)]
pub struct CreateFarm {
    pub token: RuneToken,
    pub reward_token: RuneToken,
    pub reward_per_block: Amount,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
}

/// Stake or unstake request
#[derive(Debug, Clone)]
pub struct StakeRequest {
    pub owner: String,
    pub farm_id: String,
    pub amount: Amount,
    pub deadline: TimestampMs,
}

#[derive(Debug, Clone)]
pub struct StakeReceipt {
    pub farm_id: String,
    pub amount: Amount,
    /// Reward harvested by the operation
    pub reward: Amount,
    /// Stake the owner holds afterwards
    pub staked: Amount,
    pub block: BlockHeight,
    pub submission: SubmissionReceipt,
}

#[derive(Debug, Clone)]
pub struct FarmView {
    pub farm: Farm,
    pub status: FarmStatus,
}

#[derive(Debug, Clone)]
pub struct PendingReward {
    pub farm_id: String,
    pub owner: String,
    pub staked: Amount,
    pub pending: Amount,
    pub block: BlockHeight,
}
