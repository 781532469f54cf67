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

use crate::balances::{compute_network_balances, NetworkBalances};
use crate::error::{Duty, Error, Result};
use crate::network::Network;
use crate::price::compute_twap_price;
use crate::provider::{BeaconClient, ExecutionClient, SmoothingPoolEstimator, StateManager, TwapPool};
use crate::slot::{resolve_target, StateTarget};
use crate::state::NetworkState;
use crate::units::{round_down, signed, wei_to_eth};
use alloy_primitives::U256;

/// Runs oracle DAO duties against a target block without submitting anything
pub struct Oracle<E, B, S> {
    pub execution: E,
    pub beacon: B,
    pub states: S,
    pub network: Network,
}

impl<E, B, S> Oracle<E, B, S>
where
    E: ExecutionClient,
    B: BeaconClient,
    S: StateManager,
{
    pub fn new(execution: E, beacon: B, states: S, network: Network) -> Self {
        Self {
            execution,
            beacon,
            states,
            network,
        }
    }

    /// Network state at the beacon slot aligned with `target_block`, or at the head
    pub async fn load_state(&self, target_block: Option<u64>) -> Result<NetworkState> {
        match resolve_target(&self.execution, &self.beacon, target_block).await? {
            StateTarget::Head => self.states.head_state().await,
            StateTarget::Slot { el_block, slot } => {
                self.states.state_for_slot(slot).await.map_err(|e| {
                    Error::upstream(
                        format!("error getting state for EL block {el_block}, CL slot {slot}"),
                        e,
                    )
                })
            }
        }
    }

    /// Calculate the balances report an oracle node would submit for the target
    #[tracing::instrument(skip(self, smoothing_pool))]
    pub async fn network_balances<P: SmoothingPoolEstimator>(
        &self,
        target_block: Option<u64>,
        smoothing_pool: &P,
    ) -> Result<NetworkBalances> {
        let state = self.load_state(target_block).await?;
        if !state.network_details.submit_balances_enabled {
            return Err(Error::FeatureDisabled(Duty::Balances));
        }

        let block_number = state.el_block_number;
        tracing::info!("Calculating network balances for block {}...", block_number);
        let header = self.execution.header_by_number(block_number).await?;

        let balances =
            compute_network_balances(&state, &header, smoothing_pool, state.is_atlas_deployed)
                .await?;
        log_balances(&balances);
        tracing::info!("Balance report complete.");

        Ok(balances)
    }

    /// Calculate the RPL price an oracle node would submit for the target
    #[tracing::instrument(skip(self, pool))]
    pub async fn rpl_price<P: TwapPool>(&self, target_block: Option<u64>, pool: &P) -> Result<U256> {
        let state = self.load_state(target_block).await?;
        if !state.network_details.submit_prices_enabled {
            return Err(Error::FeatureDisabled(Duty::Prices));
        }

        let block_number = state.el_block_number;
        tracing::info!("Getting RPL price for block {}...", block_number);
        let price = compute_twap_price(pool, self.network, block_number).await?;

        tracing::info!(
            "RPL price: {:.6} ETH",
            round_down(wei_to_eth(signed(price)), 6)
        );
        tracing::info!("Price report complete.");

        Ok(price)
    }
}

fn log_balances(balances: &NetworkBalances) {
    tracing::info!("Deposit pool balance: {} wei", balances.deposit_pool);
    tracing::info!("Node credit balance: {} wei", balances.node_credit_balance);
    tracing::info!("Total minipool user balance: {} wei", balances.minipools_total);
    tracing::info!("Staking minipool user balance: {} wei", balances.minipools_staking);
    tracing::info!("Fee distributor user balance: {} wei", balances.distributor_share_total);
    tracing::info!("Smoothing pool user balance: {} wei", balances.smoothing_pool_share);
    tracing::info!("rETH contract balance: {} wei", balances.reth_contract);
    tracing::info!("rETH token supply: {} wei", balances.reth_supply);
    tracing::info!("Total ETH = {}", balances.total_backing());
    tracing::info!("Calculated ratio = {:.6}", balances.implied_exchange_rate());
}
