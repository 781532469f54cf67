use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use rocketpool_oracle_core::provider::{
    BeaconClient, ExecutionClient, SmoothingPoolEstimator, SmoothingPoolRequest, StateManager,
    TwapPool,
};
use rocketpool_oracle_core::state::{
    BeaconConfig, BlockHeader, MinipoolDepositType, MinipoolDetails, MinipoolStatus,
    NetworkDetails, NetworkState, NodeDetails, ValidatorDetails, ValidatorPubkey,
};
use rocketpool_oracle_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

pub struct TestStateBuilder {
    inner: NetworkState,
}

impl TestStateBuilder {
    pub fn new(slot: u64) -> Self {
        let beacon_config = BeaconConfig::default();
        Self {
            inner: NetworkState {
                el_block_number: slot + 1_000_000,
                beacon_slot_number: slot,
                beacon_config,
                network_details: NetworkDetails {
                    reward_index: 10,
                    interval_start: beacon_config.genesis_time,
                    interval_duration: 28 * 24 * 60 * 60,
                    submit_balances_enabled: true,
                    submit_prices_enabled: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    pub fn epoch(&self) -> u64 {
        self.inner.beacon_slot_number / self.inner.beacon_config.slots_per_epoch
    }

    /// Adds a minipool with a validator that has been active for a while and is not exiting
    pub fn with_staking_minipool(&mut self, user_share: U256) -> &mut Self {
        let mut minipool = self.minipool(MinipoolStatus::Staking, MinipoolDepositType::Variable);
        minipool.user_share_of_balance_including_beacon = user_share;
        let validator = self.active_validator();
        self.with_minipool(minipool, Some(validator))
    }

    /// Adds a minipool that has not reached the beacon chain yet
    pub fn with_prelaunch_minipool(&mut self, user_deposit: U256) -> &mut Self {
        let mut minipool = self.minipool(MinipoolStatus::Prelaunch, MinipoolDepositType::Variable);
        minipool.user_deposit_balance = user_deposit;
        self.with_minipool(minipool, None)
    }

    pub fn with_minipool(
        &mut self,
        minipool: MinipoolDetails,
        validator: Option<ValidatorDetails>,
    ) -> &mut Self {
        if let Some(validator) = validator {
            self.inner
                .validator_details
                .insert(minipool.pubkey, validator);
        }
        self.inner.minipool_details.push(minipool);
        self
    }

    pub fn with_node(&mut self, distributor_user_eth: U256, deposit_credit: U256) -> &mut Self {
        self.inner.node_details.push(NodeDetails {
            distributor_balance_user_eth: distributor_user_eth,
            deposit_credit_balance: deposit_credit,
        });
        self
    }

    pub fn with_network_details(&mut self, f: impl FnOnce(&mut NetworkDetails)) -> &mut Self {
        f(&mut self.inner.network_details);
        self
    }

    pub fn with_atlas(&mut self, deployed: bool) -> &mut Self {
        self.inner.is_atlas_deployed = deployed;
        self
    }

    /// A fresh minipool with a unique pubkey, 24 ETH of user funds and 8 ETH of node funds
    pub fn minipool(
        &self,
        status: MinipoolStatus,
        deposit_type: MinipoolDepositType,
    ) -> MinipoolDetails {
        MinipoolDetails {
            status,
            deposit_type,
            version: 3,
            is_vacant: false,
            user_deposit_balance: ether("24"),
            node_deposit_balance: ether("8"),
            node_refund_balance: U256::ZERO,
            balance: U256::ZERO,
            user_share_of_balance_including_beacon: ether("24"),
            pubkey: self.next_pubkey(),
        }
    }

    pub fn active_validator(&self) -> ValidatorDetails {
        ValidatorDetails {
            exists: true,
            activation_epoch: self.epoch().saturating_sub(1000),
            exit_epoch: u64::MAX,
            balance: 32_000_000_000,
        }
    }

    fn next_pubkey(&self) -> ValidatorPubkey {
        let index = self.inner.minipool_details.len() as u64 + 1;
        let mut pubkey = ValidatorPubkey::ZERO;
        pubkey[40..].copy_from_slice(&index.to_be_bytes());
        pubkey
    }

    /// Header of the execution block the state was taken at
    pub fn header(&self) -> BlockHeader {
        let config = &self.inner.beacon_config;
        BlockHeader {
            number: self.inner.el_block_number,
            timestamp: config.genesis_time + self.inner.beacon_slot_number * config.seconds_per_slot,
        }
    }

    pub fn build(&self) -> NetworkState {
        self.inner.clone()
    }
}

/// Smoothing pool estimator that always returns the same share and remembers what it was asked
#[derive(Default)]
pub struct FixedSmoothingPool {
    share: U256,
    requests: Mutex<Vec<(u64, u64, u64, u64, u64)>>,
}

impl FixedSmoothingPool {
    pub fn new(share: U256) -> Self {
        Self {
            share,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// (interval index, start time, end time, target slot, intervals passed) of each call
    pub fn requests(&self) -> Vec<(u64, u64, u64, u64, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

impl SmoothingPoolEstimator for FixedSmoothingPool {
    async fn approximate_staker_share(&self, request: SmoothingPoolRequest<'_>) -> Result<U256> {
        self.requests.lock().unwrap().push((
            request.interval_index,
            request.start_time,
            request.end_time,
            request.target_slot,
            request.intervals_passed,
        ));
        Ok(self.share)
    }
}

pub struct FailingSmoothingPool;

impl SmoothingPoolEstimator for FailingSmoothingPool {
    async fn approximate_staker_share(&self, _request: SmoothingPoolRequest<'_>) -> Result<U256> {
        Err(Error::upstream(
            "error getting approximate share of smoothing pool",
            "connection refused",
        ))
    }
}

/// In-memory chain: execution headers, beacon config and network states by slot
#[derive(Clone, Default)]
pub struct MockChain {
    pub beacon_config: BeaconConfig,
    pub headers: BTreeMap<u64, BlockHeader>,
    pub states: BTreeMap<u64, NetworkState>,
    pub head: Option<NetworkState>,
    /// Makes every beacon config request fail
    pub beacon_unavailable: bool,
}

impl MockChain {
    /// Registers the state under its slot and its execution block header
    pub fn with_state(mut self, state: NetworkState, header: BlockHeader) -> Self {
        self.headers.insert(header.number, header);
        self.states.insert(state.beacon_slot_number, state);
        self
    }

    pub fn with_head(mut self, state: NetworkState, header: BlockHeader) -> Self {
        self.headers.insert(header.number, header);
        self.head = Some(state);
        self
    }

    pub fn with_header(mut self, header: BlockHeader) -> Self {
        self.headers.insert(header.number, header);
        self
    }

    pub fn with_beacon_unavailable(mut self) -> Self {
        self.beacon_unavailable = true;
        self
    }
}

impl ExecutionClient for MockChain {
    async fn header_by_number(&self, number: u64) -> Result<BlockHeader> {
        self.headers
            .get(&number)
            .copied()
            .ok_or_else(|| Error::upstream(format!("header {number}"), "not found"))
    }
}

impl BeaconClient for MockChain {
    async fn eth2_config(&self) -> Result<BeaconConfig> {
        if self.beacon_unavailable {
            return Err(Error::upstream("error getting beacon config", "connection refused"));
        }
        Ok(self.beacon_config)
    }
}

impl StateManager for MockChain {
    async fn head_state(&self) -> Result<NetworkState> {
        self.head
            .clone()
            .ok_or_else(|| Error::upstream("head state", "not available"))
    }

    async fn state_for_slot(&self, slot: u64) -> Result<NetworkState> {
        self.states
            .get(&slot)
            .cloned()
            .ok_or_else(|| Error::upstream(format!("state for slot {slot}"), "not available"))
    }
}

/// Pool returning fixed tick cumulatives and recording the blocks it was queried at
pub struct MockPool {
    tick_cumulatives: [i64; 2],
    calls: Mutex<Vec<(Address, u64, [u32; 2])>>,
}

impl MockPool {
    pub fn new(tick_cumulatives: [i64; 2]) -> Self {
        Self {
            tick_cumulatives,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Address, u64, [u32; 2])> {
        self.calls.lock().unwrap().clone()
    }
}

impl TwapPool for MockPool {
    async fn observe(&self, pool: Address, block_number: u64, seconds_agos: [u32; 2]) -> Result<[i64; 2]> {
        self.calls
            .lock()
            .unwrap()
            .push((pool, block_number, seconds_agos));
        Ok(self.tick_cumulatives)
    }
}
