// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Point-in-time view of the protocol joining execution layer contract state with
//! the beacon chain validator registry. Produced by the network state service and
//! only ever read here.

use crate::error::{Error, Result};
use alloy_primitives::{FixedBytes, U256};
use std::collections::BTreeMap;

pub type ValidatorPubkey = FixedBytes<48>;

/// Consensus layer timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BeaconConfig {
    /// Unix timestamp of the beacon chain genesis
    pub genesis_time: u64,
    pub seconds_per_slot: u64,
    pub slots_per_epoch: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        // mainnet
        Self {
            genesis_time: 1606824023,
            seconds_per_slot: 12,
            slots_per_epoch: 32,
        }
    }
}

/// Execution layer block header fields the duties depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    /// Unix timestamp in seconds
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MinipoolStatus {
    Initialized,
    Prelaunch,
    Staking,
    Withdrawable,
    Dissolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MinipoolDepositType {
    None,
    Full,
    Half,
    Empty,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MinipoolDetails {
    pub status: MinipoolStatus,
    pub deposit_type: MinipoolDepositType,
    /// Delegate version of the minipool contract
    pub version: u8,
    pub is_vacant: bool,
    pub user_deposit_balance: U256,
    pub node_deposit_balance: U256,
    pub node_refund_balance: U256,
    /// ETH held by the minipool contract itself
    pub balance: U256,
    /// Contract-calculated user share of (beacon balance + contract balance - refund)
    pub user_share_of_balance_including_beacon: U256,
    pub pubkey: ValidatorPubkey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidatorDetails {
    pub exists: bool,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    /// Beacon balance in gwei
    pub balance: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeDetails {
    /// User share of the node's fee distributor, calculated off-chain. Takes precedence over the
    /// equivalent contract call.
    pub distributor_balance_user_eth: U256,
    /// Only meaningful once Atlas is deployed
    pub deposit_credit_balance: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NetworkDetails {
    pub reward_index: u64,
    /// Unix timestamp the current rewards interval started at
    pub interval_start: u64,
    /// Intended length of a rewards interval in seconds
    pub interval_duration: u64,
    /// Pre-Atlas deposit pool balance
    pub deposit_pool_balance: U256,
    /// Deposit pool balance excluding node credit, valid from Atlas onwards
    pub deposit_pool_user_balance: U256,
    pub reth_balance: U256,
    pub total_reth_supply: U256,
    pub submit_balances_enabled: bool,
    pub submit_prices_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NetworkState {
    pub el_block_number: u64,
    pub beacon_slot_number: u64,
    pub beacon_config: BeaconConfig,
    pub network_details: NetworkDetails,
    pub minipool_details: Vec<MinipoolDetails>,
    pub node_details: Vec<NodeDetails>,
    pub validator_details: BTreeMap<ValidatorPubkey, ValidatorDetails>,
    pub is_atlas_deployed: bool,
}

impl NetworkState {
    /// The beacon epoch the state was taken in
    pub fn beacon_epoch(&self) -> Result<u64> {
        self.beacon_slot_number
            .checked_div(self.beacon_config.slots_per_epoch)
            .ok_or_else(|| Error::InvalidState("slots per epoch is zero".into()))
    }

    pub fn validator(&self, pubkey: &ValidatorPubkey) -> Option<&ValidatorDetails> {
        self.validator_details.get(pubkey)
    }
}
