//! In-process submitters used when no broadcaster is wired in

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::execution::{
    ConfirmationStatus, StateDelta, SubmissionReceipt, TransactionSubmitter,
};
use crate::shared::clock::Clock;
use crate::shared::errors::ExecutionError;
use crate::shared::utils::generate_id;

/// Accepts every delta and reports it as simulated
pub struct DryRunSubmitter {
    clock: Arc<dyn Clock>,
}

impl DryRunSubmitter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn submit(&self, delta: &StateDelta) -> Result<SubmissionReceipt, ExecutionError> {
        let receipt = SubmissionReceipt {
            tx_id: generate_id(),
            status: ConfirmationStatus::Simulated,
            submitted_at: self.clock.now_millis(),
        };

        debug!(
            kind = delta.kind(),
            record = delta.record_id(),
            tx_id = %receipt.tx_id,
            "simulated submission"
        );
        Ok(receipt)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Live mode without a broadcaster: rejects everything so callers roll back
pub struct UnavailableSubmitter;

#[async_trait]
impl TransactionSubmitter for UnavailableSubmitter {
    async fn submit(&self, delta: &StateDelta) -> Result<SubmissionReceipt, ExecutionError> {
        warn!(kind = delta.kind(), record = delta.record_id(), "no broadcaster configured");
        Err(ExecutionError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
