//! Transaction submitters

pub mod dry_run;

pub use dry_run::{DryRunSubmitter, UnavailableSubmitter};

use std::sync::Arc;

use crate::domain::execution::TransactionSubmitter;
use crate::shared::clock::Clock;
use crate::shared::config::ExecutionConfig;

/// Pick the submitter matching the execution settings
pub fn submitter_for(config: &ExecutionConfig, clock: Arc<dyn Clock>) -> Arc<dyn TransactionSubmitter> {
    if config.simulate_only {
        Arc::new(DryRunSubmitter::new(clock))
    } else {
        Arc::new(UnavailableSubmitter)
    }
}
