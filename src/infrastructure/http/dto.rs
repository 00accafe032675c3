//! JSON request and response bodies

use serde::{Deserialize, Serialize};

use crate::application::requests::*;
use crate::domain::execution::ConfirmationStatus;
use crate::domain::farm::{Farm, FarmStatus};
use crate::domain::pool::SwapOutcome;
use crate::shared::errors::AmmError;
use crate::shared::types::{Amount, BlockHeight, RuneToken, TimestampMs};

/// Amount fields arrive as strings so malformed values surface as `InvalidAmount`
fn amount(raw: &str) -> Result<Amount, AmmError> {
    Amount::parse(raw)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolBody {
    pub token_a: RuneToken,
    pub token_b: RuneToken,
    pub fee: Option<u32>,
}

impl From<CreatePoolBody> for CreatePool {
    fn from(body: CreatePoolBody) -> Self {
        CreatePool {
            token_a: body.token_a,
            token_b: body.token_b,
            fee: body.fee,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityBody {
    pub owner: String,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: String,
    pub amount_b: String,
    pub min_liquidity: String,
    pub tolerance_bps: Option<u32>,
    pub deadline: TimestampMs,
}

impl TryFrom<AddLiquidityBody> for AddLiquidity {
    type Error = AmmError;

    fn try_from(body: AddLiquidityBody) -> Result<Self, Self::Error> {
        Ok(AddLiquidity {
            owner: body.owner,
            token_a: body.token_a,
            token_b: body.token_b,
            amount_a: amount(&body.amount_a)?,
            amount_b: amount(&body.amount_b)?,
            min_liquidity: amount(&body.min_liquidity)?,
            tolerance_bps: body.tolerance_bps,
            deadline: body.deadline,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityBody {
    pub owner: String,
    pub pool_id: String,
    pub liquidity: String,
    pub min_amount_a: String,
    pub min_amount_b: String,
    pub deadline: TimestampMs,
}

impl TryFrom<RemoveLiquidityBody> for RemoveLiquidity {
    type Error = AmmError;

    fn try_from(body: RemoveLiquidityBody) -> Result<Self, Self::Error> {
        Ok(RemoveLiquidity {
            owner: body.owner,
            pool_id: body.pool_id,
            liquidity: amount(&body.liquidity)?,
            min_amount_a: amount(&body.min_amount_a)?,
            min_amount_b: amount(&body.min_amount_b)?,
            deadline: body.deadline,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityResponse {
    pub success: bool,
    pub pool_id: String,
    pub liquidity: Amount,
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub balance: Amount,
    pub tx_id: String,
    pub status: ConfirmationStatus,
}

impl From<LiquidityReceipt> for LiquidityResponse {
    fn from(receipt: LiquidityReceipt) -> Self {
        Self {
            success: true,
            pool_id: receipt.pool_id,
            liquidity: receipt.liquidity,
            amount_a: receipt.amount_a,
            amount_b: receipt.amount_b,
            balance: receipt.balance,
            tx_id: receipt.submission.tx_id,
            status: receipt.submission.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
}

impl QuoteBody {
    pub fn amount_in(&self) -> Result<Amount, AmmError> {
        amount(&self.amount_in)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fee_amount: Amount,
    /// Percentage
    pub price_impact: f64,
}

impl From<SwapOutcome> for QuoteResponse {
    fn from(outcome: SwapOutcome) -> Self {
        Self {
            token_in: outcome.token_in,
            token_out: outcome.token_out,
            amount_in: outcome.amount_in,
            amount_out: outcome.amount_out,
            fee_amount: outcome.fee_amount,
            price_impact: outcome.price_impact.as_f64(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapBody {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub min_amount_out: String,
    pub slippage: Option<f64>,
    pub deadline: TimestampMs,
}

impl TryFrom<SwapBody> for SwapRequest {
    type Error = AmmError;

    fn try_from(body: SwapBody) -> Result<Self, Self::Error> {
        Ok(SwapRequest {
            amount_in: amount(&body.amount_in)?,
            min_amount_out: amount(&body.min_amount_out)?,
            token_in: body.token_in,
            token_out: body.token_out,
            slippage: body.slippage,
            deadline: body.deadline,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub success: bool,
    pub pool_id: String,
    pub tx_id: String,
    pub status: ConfirmationStatus,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fee_amount: Amount,
    pub price_impact: f64,
}

impl From<SwapReceipt> for SwapResponse {
    fn from(receipt: SwapReceipt) -> Self {
        Self {
            success: true,
            pool_id: receipt.pool_id,
            tx_id: receipt.submission.tx_id,
            status: receipt.submission.status,
            amount_in: receipt.outcome.amount_in,
            amount_out: receipt.outcome.amount_out,
            fee_amount: receipt.outcome.fee_amount,
            price_impact: receipt.outcome.price_impact.as_f64(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmBody {
    pub token: RuneToken,
    pub reward_token: RuneToken,
    pub reward_per_block: String,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
}

impl TryFrom<CreateFarmBody> for CreateFarm {
    type Error = AmmError;

    fn try_from(body: CreateFarmBody) -> Result<Self, Self::Error> {
        Ok(CreateFarm {
            reward_per_block: amount(&body.reward_per_block)?,
            token: body.token,
            reward_token: body.reward_token,
            start_block: body.start_block,
            end_block: body.end_block,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmResponse {
    #[serde(flatten)]
    pub farm: Farm,
    pub status: FarmStatus,
}

impl From<FarmView> for FarmResponse {
    fn from(view: FarmView) -> Self {
        Self {
            farm: view.farm,
            status: view.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeBody {
    pub owner: String,
    pub farm_id: String,
    pub amount: String,
    pub deadline: TimestampMs,
}

impl TryFrom<StakeBody> for StakeRequest {
    type Error = AmmError;

    fn try_from(body: StakeBody) -> Result<Self, Self::Error> {
        Ok(StakeRequest {
            amount: amount(&body.amount)?,
            owner: body.owner,
            farm_id: body.farm_id,
            deadline: body.deadline,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeResponse {
    pub success: bool,
    pub farm_id: String,
    pub amount: Amount,
    pub reward: Amount,
    pub staked: Amount,
    pub block: BlockHeight,
    pub tx_id: String,
    pub status: ConfirmationStatus,
}

impl From<StakeReceipt> for StakeResponse {
    fn from(receipt: StakeReceipt) -> Self {
        Self {
            success: true,
            farm_id: receipt.farm_id,
            amount: receipt.amount,
            reward: receipt.reward,
            staked: receipt.staked,
            block: receipt.block,
            tx_id: receipt.submission.tx_id,
            status: receipt.submission.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingResponse {
    pub farm_id: String,
    pub owner: String,
    pub staked: Amount,
    pub pending: Amount,
    pub block: BlockHeight,
}

impl From<PendingReward> for PendingResponse {
    fn from(pending: PendingReward) -> Self {
        Self {
            farm_id: pending.farm_id,
            owner: pending.owner,
            staked: pending.staked,
            pending: pending.pending,
            block: pending.block,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub block: BlockHeight,
    pub submitter: &'static str,
}
