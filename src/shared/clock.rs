//! Time and chain-height sources injected into the service

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::shared::types::{BlockHeight, TimestampMs};

/// Wall clock used for request deadlines
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> TimestampMs;
}

/// Source of the current block height used for farm accrual
pub trait ChainTip: Send + Sync {
    fn current_block(&self) -> BlockHeight;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: TimestampMs) -> Self {
        Self { now: AtomicI64::new(now) }
    }

    pub fn set(&self, now: TimestampMs) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}

/// Estimates the tip from a known (height, time) anchor and a fixed block interval
pub struct EstimatedChainTip {
    anchor_height: BlockHeight,
    anchor_time_ms: TimestampMs,
    block_interval_ms: u64,
    clock: Arc<dyn Clock>,
}

impl EstimatedChainTip {
    pub fn new(
        anchor_height: BlockHeight,
        anchor_time_ms: TimestampMs,
        block_interval_ms: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            anchor_height,
            anchor_time_ms,
            block_interval_ms: block_interval_ms.max(1),
            clock,
        }
    }
}

impl ChainTip for EstimatedChainTip {
    fn current_block(&self) -> BlockHeight {
        let elapsed = self.clock.now_millis().saturating_sub(self.anchor_time_ms);
        if elapsed <= 0 {
            return self.anchor_height;
        }
        self.anchor_height + elapsed as u64 / self.block_interval_ms
    }
}

/// Chain tip that only moves when told to
#[derive(Debug, Default)]
pub struct ManualChainTip {
    height: AtomicU64,
}

impl ManualChainTip {
    pub fn new(height: BlockHeight) -> Self {
        Self { height: AtomicU64::new(height) }
    }

    pub fn set(&self, height: BlockHeight) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl ChainTip for ManualChainTip {
    fn current_block(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_tip_counts_whole_intervals() {
        let clock = Arc::new(ManualClock::new(1_000));
        let tip = EstimatedChainTip::new(840_000, 1_000, 600_000, clock.clone());
        assert_eq!(tip.current_block(), 840_000);

        clock.set(1_000 + 599_999);
        assert_eq!(tip.current_block(), 840_000);

        clock.set(1_000 + 1_800_000);
        assert_eq!(tip.current_block(), 840_003);
    }

    #[test]
    fn test_estimated_tip_before_anchor_stays_at_anchor() {
        let clock = Arc::new(ManualClock::new(0));
        let tip = EstimatedChainTip::new(100, 5_000, 1_000, clock);
        assert_eq!(tip.current_block(), 100);
    }
}
