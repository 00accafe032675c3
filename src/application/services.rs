//! Application services and use cases

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::application::requests::*;
use crate::domain::accounts::{FarmAccount, PoolAccount};
use crate::domain::execution::{StateDelta, SubmissionReceipt, TransactionSubmitter};
use crate::domain::farm::Farm;
use crate::domain::pool::{Pool, PoolKey, SwapOutcome};
use crate::domain::registry::{Record, Registry};
use crate::infrastructure::storage::Snapshot;
use crate::shared::clock::{ChainTip, Clock};
use crate::shared::config::PoolsConfig;
use crate::shared::errors::{AmmError, ServiceError};
use crate::shared::types::{Amount, BlockHeight, TimestampMs};
use crate::shared::utils::ensure_deadline;

/// Pool, swap and farm use cases over the in-memory registries.
///
/// Every mutating operation follows the same shape: lock the record, check
/// the deadline, apply the change, release the lock, then hand the change to
/// the submitter. If submission fails the record is locked again and the
/// inverse change is applied before the error is returned.
pub struct DefiService {
    pools: Registry<PoolKey, PoolAccount>,
    farms: Registry<String, FarmAccount>,
    clock: Arc<dyn Clock>,
    chain: Arc<dyn ChainTip>,
    submitter: Arc<dyn TransactionSubmitter>,
    config: PoolsConfig,
}

impl DefiService {
    pub fn new(
        config: PoolsConfig,
        clock: Arc<dyn Clock>,
        chain: Arc<dyn ChainTip>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self {
            pools: Registry::new(),
            farms: Registry::new(),
            clock,
            chain,
            submitter,
            config,
        }
    }

    pub fn current_block(&self) -> BlockHeight {
        self.chain.current_block()
    }

    pub fn submitter_name(&self) -> &'static str {
        self.submitter.name()
    }

    // ---- pools ----

    pub async fn create_pool(&self, request: CreatePool) -> Result<Pool, ServiceError> {
        let fee = request.fee.unwrap_or(self.config.default_fee);
        let pool = Pool::new(request.token_a, request.token_b, fee, self.clock.now_millis())?;
        self.pools
            .create(pool.key(), PoolAccount::new(pool.clone()))
            .await?;

        info!(pool = %pool.id, fee, "created pool");
        Ok(pool)
    }

    pub async fn list_pools(&self) -> Vec<Pool> {
        self.pools
            .values()
            .await
            .into_iter()
            .map(|account| account.pool)
            .collect()
    }

    /// Look a pool up by `a-b` id; either token order resolves
    pub async fn get_pool(&self, pool_id: &str) -> Result<Pool, ServiceError> {
        let record = self.pool_record(&pool_id.parse::<PoolKey>()?).await?;
        let account = record.lock().await;
        Ok(account.pool.clone())
    }

    pub async fn add_liquidity(&self, request: AddLiquidity) -> Result<LiquidityReceipt, ServiceError> {
        let key = PoolKey::new(&request.token_a, &request.token_b)?;
        let record = self.pool_record(&key).await?;
        let owner = request.owner;

        let (pool_id, amount_a, amount_b, liquidity, balance) = {
            let mut account = record.lock().await;
            let now = self.clock.now_millis();
            ensure_deadline(request.deadline, now)?;

            let (amount_a, amount_b) = if request.token_a == account.pool.token_a.rune_id {
                (request.amount_a, request.amount_b)
            } else {
                (request.amount_b, request.amount_a)
            };
            let tolerance = request
                .tolerance_bps
                .unwrap_or(self.config.ratio_tolerance_bps);

            let minted = account.pool.add_liquidity(
                &amount_a,
                &amount_b,
                &request.min_liquidity,
                tolerance,
                now,
            )?;
            account.credit(&owner, &minted);
            account.hold(&owner, &minted);
            (
                account.pool.id.clone(),
                amount_a,
                amount_b,
                minted,
                account.liquidity_of(&owner),
            )
        };

        let delta = StateDelta::AddLiquidity {
            pool_id: pool_id.clone(),
            owner: owner.clone(),
            amount_a: amount_a.clone(),
            amount_b: amount_b.clone(),
            liquidity: liquidity.clone(),
        };
        let submission = {
            let owner = owner.clone();
            let (amount_a, amount_b, liquidity) = (amount_a.clone(), amount_b.clone(), liquidity.clone());
            self.settle(&record, &delta, move |account: &mut PoolAccount, now| {
                account.revert_deposit(&owner, &amount_a, &amount_b, &liquidity, now)
            })
            .await?
        };
        record.lock().await.release(&owner, &liquidity);

        info!(pool = %pool_id, liquidity = %liquidity, "added liquidity");
        Ok(LiquidityReceipt {
            pool_id,
            liquidity,
            amount_a,
            amount_b,
            balance,
            submission,
        })
    }

    pub async fn remove_liquidity(
        &self,
        request: RemoveLiquidity,
    ) -> Result<LiquidityReceipt, ServiceError> {
        let record = self.pool_record(&request.pool_id.parse::<PoolKey>()?).await?;
        let owner = request.owner;
        let liquidity = request.liquidity;

        let (pool_id, amount_a, amount_b, balance) = {
            let mut account = record.lock().await;
            let now = self.clock.now_millis();
            ensure_deadline(request.deadline, now)?;

            if liquidity.is_positive() && account.burnable(&owner) < liquidity {
                return Err(AmmError::InsufficientLiquidity(format!(
                    "{} can burn {} settled liquidity in {}, requested {}",
                    owner,
                    account.burnable(&owner),
                    account.pool.id,
                    liquidity
                ))
                .into());
            }

            let (amount_a, amount_b) = account.pool.remove_liquidity(
                &liquidity,
                &request.min_amount_a,
                &request.min_amount_b,
                now,
            )?;
            account.debit(&owner, &liquidity)?;
            (
                account.pool.id.clone(),
                amount_a,
                amount_b,
                account.liquidity_of(&owner),
            )
        };

        let delta = StateDelta::RemoveLiquidity {
            pool_id: pool_id.clone(),
            owner: owner.clone(),
            liquidity: liquidity.clone(),
            amount_a: amount_a.clone(),
            amount_b: amount_b.clone(),
        };
        let submission = {
            let (amount_a, amount_b, liquidity) = (amount_a.clone(), amount_b.clone(), liquidity.clone());
            self.settle(&record, &delta, move |account: &mut PoolAccount, now| {
                account
                    .pool
                    .revert_remove_liquidity(&amount_a, &amount_b, &liquidity, now);
                account.credit(&owner, &liquidity);
                Ok(())
            })
            .await?
        };

        info!(pool = %pool_id, liquidity = %liquidity, "removed liquidity");
        Ok(LiquidityReceipt {
            pool_id,
            liquidity,
            amount_a,
            amount_b,
            balance,
            submission,
        })
    }

    // ---- swaps ----

    /// Price a swap against current reserves without changing anything
    pub async fn quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &Amount,
    ) -> Result<SwapOutcome, ServiceError> {
        let key = PoolKey::new(token_in, token_out)?;
        let record = self.pool_record(&key).await?;
        let account = record.lock().await;
        let outcome = account.pool.quote(token_in, amount_in)?;

        debug!(
            pool = %account.pool.id,
            amount_in = %outcome.amount_in,
            amount_out = %outcome.amount_out,
            impact = %outcome.price_impact,
            "quoted swap"
        );
        Ok(outcome)
    }

    pub async fn swap(&self, request: SwapRequest) -> Result<SwapReceipt, ServiceError> {
        let key = PoolKey::new(&request.token_in, &request.token_out)?;
        let record = self.pool_record(&key).await?;

        let (pool_id, outcome) = {
            let mut account = record.lock().await;
            let now = self.clock.now_millis();
            ensure_deadline(request.deadline, now)?;

            let outcome = account.pool.swap(
                &request.token_in,
                &request.amount_in,
                &request.min_amount_out,
                now,
            )?;
            (account.pool.id.clone(), outcome)
        };

        let delta = StateDelta::Swap {
            pool_id: pool_id.clone(),
            token_in: outcome.token_in.clone(),
            token_out: outcome.token_out.clone(),
            amount_in: outcome.amount_in.clone(),
            amount_out: outcome.amount_out.clone(),
        };
        let submission = {
            let outcome = outcome.clone();
            self.settle(&record, &delta, move |account: &mut PoolAccount, now| {
                account.pool.revert_swap(&outcome, now)
            })
            .await?
        };

        info!(
            pool = %pool_id,
            token_in = %outcome.token_in,
            amount_in = %outcome.amount_in,
            amount_out = %outcome.amount_out,
            slippage = ?request.slippage,
            "executed swap"
        );
        Ok(SwapReceipt {
            pool_id,
            outcome,
            submission,
        })
    }

    // ---- farms ----

    pub async fn create_farm(&self, request: CreateFarm) -> Result<FarmView, ServiceError> {
        let farm = Farm::new(
            request.token,
            request.reward_token,
            request.reward_per_block,
            request.start_block,
            request.end_block,
        )?;
        self.farms
            .create(farm.id.clone(), FarmAccount::new(farm.clone()))
            .await?;

        info!(
            farm = %farm.id,
            start = farm.start_block,
            end = farm.end_block,
            "created farm"
        );
        Ok(self.view(farm))
    }

    pub async fn list_farms(&self) -> Vec<FarmView> {
        self.farms
            .values()
            .await
            .into_iter()
            .map(|account| self.view(account.farm))
            .collect()
    }

    pub async fn get_farm(&self, farm_id: &str) -> Result<FarmView, ServiceError> {
        let record = self.farm_record(farm_id).await?;
        let farm = record.lock().await.farm.clone();
        Ok(self.view(farm))
    }

    pub async fn stake(&self, request: StakeRequest) -> Result<StakeReceipt, ServiceError> {
        let record = self.farm_record(&request.farm_id).await?;
        let owner = request.owner;

        let (change, staked, block) = {
            let mut account = record.lock().await;
            ensure_deadline(request.deadline, self.clock.now_millis())?;
            let block = self.chain.current_block();

            let change = account.stake(&owner, &request.amount, block)?;
            (change, account.position(&owner).amount, block)
        };

        let delta = StateDelta::Stake {
            farm_id: request.farm_id.clone(),
            owner: owner.clone(),
            amount: change.amount.clone(),
            reward: change.reward.clone(),
        };
        let submission = {
            let change = change.clone();
            self.settle(&record, &delta, move |account: &mut FarmAccount, _| {
                account.revert_stake(&owner, &change)
            })
            .await?
        };

        info!(farm = %request.farm_id, amount = %change.amount, block, "staked");
        Ok(StakeReceipt {
            farm_id: request.farm_id,
            amount: change.amount,
            reward: change.reward,
            staked,
            block,
            submission,
        })
    }

    pub async fn unstake(&self, request: StakeRequest) -> Result<StakeReceipt, ServiceError> {
        let record = self.farm_record(&request.farm_id).await?;
        let owner = request.owner;

        let (change, staked, block) = {
            let mut account = record.lock().await;
            ensure_deadline(request.deadline, self.clock.now_millis())?;
            let block = self.chain.current_block();

            let change = account.unstake(&owner, &request.amount, block)?;
            (change, account.position(&owner).amount, block)
        };

        let delta = StateDelta::Unstake {
            farm_id: request.farm_id.clone(),
            owner: owner.clone(),
            amount: change.amount.clone(),
            reward: change.reward.clone(),
        };
        let submission = {
            let change = change.clone();
            self.settle(&record, &delta, move |account: &mut FarmAccount, _| {
                account.revert_unstake(&owner, &change)
            })
            .await?
        };

        info!(farm = %request.farm_id, amount = %change.amount, block, "unstaked");
        Ok(StakeReceipt {
            farm_id: request.farm_id,
            amount: change.amount,
            reward: change.reward,
            staked,
            block,
            submission,
        })
    }

    pub async fn pending_reward(
        &self,
        farm_id: &str,
        owner: &str,
    ) -> Result<PendingReward, ServiceError> {
        let record = self.farm_record(farm_id).await?;
        let account = record.lock().await;
        let block = self.chain.current_block();

        Ok(PendingReward {
            farm_id: farm_id.to_string(),
            owner: owner.to_string(),
            staked: account.position(owner).amount,
            pending: account.pending_reward(owner, block),
            block,
        })
    }

    // ---- snapshots ----

    pub async fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            saved_at: self.clock.now_millis(),
            pools: self.pools.values().await,
            farms: self.farms.values().await,
        }
    }

    /// Load a snapshot before requests are served; returns (pools, farms)
    /// restored. Every record is checked before either registry is touched.
    pub async fn restore(&self, snapshot: Snapshot) -> Result<(usize, usize), ServiceError> {
        let mut pools = Vec::with_capacity(snapshot.pools.len());
        for mut account in snapshot.pools {
            account.pool = account.pool.revalidated()?;
            pools.push((account.pool.key(), account));
        }
        let mut farms = Vec::with_capacity(snapshot.farms.len());
        for mut account in snapshot.farms {
            account.farm = account.farm.revalidated()?;
            farms.push((account.farm.id.clone(), account));
        }

        self.pools.ensure_vacant(pools.iter().map(|(key, _)| key)).await?;
        self.farms.ensure_vacant(farms.iter().map(|(key, _)| key)).await?;
        let restored = (self.pools.restore(pools).await?, self.farms.restore(farms).await?);
        info!(pools = restored.0, farms = restored.1, "restored registry state");
        Ok(restored)
    }

    // ---- internals ----

    async fn pool_record(&self, key: &PoolKey) -> Result<Record<PoolAccount>, AmmError> {
        self.pools
            .get(key)
            .await
            .ok_or_else(|| AmmError::PoolNotFound(key.to_string()))
    }

    async fn farm_record(&self, farm_id: &str) -> Result<Record<FarmAccount>, AmmError> {
        self.farms
            .get(&farm_id.to_string())
            .await
            .ok_or_else(|| AmmError::FarmNotFound(farm_id.to_string()))
    }

    fn view(&self, farm: Farm) -> FarmView {
        let status = farm.status(self.chain.current_block());
        FarmView { farm, status }
    }

    /// Submit an applied delta; on failure re-lock the record and undo it
    async fn settle<V, F>(
        &self,
        record: &Record<V>,
        delta: &StateDelta,
        rollback: F,
    ) -> Result<SubmissionReceipt, ServiceError>
    where
        V: Send,
        F: FnOnce(&mut V, TimestampMs) -> Result<(), AmmError> + Send,
    {
        match self.submitter.submit(delta).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                warn!(
                    kind = delta.kind(),
                    record = delta.record_id(),
                    error = %err,
                    "submission failed, rolling back"
                );
                let mut value = record.lock().await;
                if let Err(rollback_err) = rollback(&mut *value, self.clock.now_millis()) {
                    error!(
                        kind = delta.kind(),
                        record = delta.record_id(),
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(ServiceError::Execution(err))
            }
        }
    }
}
