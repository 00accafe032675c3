//! Execution domain - the boundary where applied state changes are settled

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::errors::ExecutionError;
use crate::shared::types::{Amount, TimestampMs};

/// A state change that has been applied locally and must be settled externally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StateDelta {
    Swap {
        pool_id: String,
        token_in: String,
        token_out: String,
        amount_in: Amount,
        amount_out: Amount,
    },
    AddLiquidity {
        pool_id: String,
        owner: String,
        amount_a: Amount,
        amount_b: Amount,
        liquidity: Amount,
    },
    RemoveLiquidity {
        pool_id: String,
        owner: String,
        liquidity: Amount,
        amount_a: Amount,
        amount_b: Amount,
    },
    Stake {
        farm_id: String,
        owner: String,
        amount: Amount,
        reward: Amount,
    },
    Unstake {
        farm_id: String,
        owner: String,
        amount: Amount,
        reward: Amount,
    },
}

impl StateDelta {
    /// Pool or farm id the delta applies to
    pub fn record_id(&self) -> &str {
        match self {
            StateDelta::Swap { pool_id, .. }
            | StateDelta::AddLiquidity { pool_id, .. }
            | StateDelta::RemoveLiquidity { pool_id, .. } => pool_id,
            StateDelta::Stake { farm_id, .. } | StateDelta::Unstake { farm_id, .. } => farm_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StateDelta::Swap { .. } => "swap",
            StateDelta::AddLiquidity { .. } => "addLiquidity",
            StateDelta::RemoveLiquidity { .. } => "removeLiquidity",
            StateDelta::Stake { .. } => "stake",
            StateDelta::Unstake { .. } => "unstake",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    /// Accepted without leaving the process
    Simulated,
    Broadcast,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub tx_id: String,
    pub status: ConfirmationStatus,
    pub submitted_at: TimestampMs,
}

/// Settles applied deltas. Implementations must not touch registry state.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, delta: &StateDelta) -> Result<SubmissionReceipt, ExecutionError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_serializes_with_kind_tag() {
        let delta = StateDelta::Stake {
            farm_id: "1-2".to_string(),
            owner: "alice".to_string(),
            amount: Amount::from(5u64),
            reward: Amount::zero(),
        };

        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["kind"], "stake");
        assert_eq!(json["farmId"], "1-2");
        assert_eq!(json["amount"], "5");
        assert_eq!(delta.record_id(), "1-2");
    }

    #[test]
    fn test_record_id_for_pool_deltas() {
        let delta = StateDelta::Swap {
            pool_id: "a-b".to_string(),
            token_in: "a".to_string(),
            token_out: "b".to_string(),
            amount_in: Amount::from(1u64),
            amount_out: Amount::from(1u64),
        };
        assert_eq!(delta.record_id(), "a-b");
        assert_eq!(delta.kind(), "swap");
    }
}
