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

use crate::error::{Error, Result};
use crate::minipool::{minipool_balance_details, MinipoolBalanceDetails};
use crate::provider::{SmoothingPoolEstimator, SmoothingPoolRequest};
use crate::state::{BlockHeader, NetworkState};
use crate::units::{signed, unsigned, wei_to_eth};
use alloy_primitives::{I256, U256};

/// The values an oracle node would submit for a balances report, all in wei
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NetworkBalances {
    pub block: u64,
    pub deposit_pool: U256,
    pub minipools_total: U256,
    pub minipools_staking: U256,
    pub distributor_share_total: U256,
    pub smoothing_pool_share: U256,
    pub reth_contract: U256,
    pub reth_supply: U256,
    pub node_credit_balance: U256,
}

impl NetworkBalances {
    /// Total ETH backing rETH. Node credit is owed to node operators so it is taken out.
    pub fn total_backing(&self) -> I256 {
        signed(self.deposit_pool)
            + signed(self.minipools_total)
            + signed(self.reth_contract)
            + signed(self.distributor_share_total)
            + signed(self.smoothing_pool_share)
            - signed(self.node_credit_balance)
    }

    /// ETH per rETH implied by the report. Only for display.
    pub fn implied_exchange_rate(&self) -> f64 {
        wei_to_eth(self.total_backing()) / wei_to_eth(signed(self.reth_supply))
    }
}

/// Compute the network balances for the given state, the way an oracle DAO member would
/// before submitting them. Minipool classification, distributor shares and the smoothing
/// pool estimate run concurrently; any failure discards the whole report.
///
/// The two in-memory branches complete on the first poll, so only the estimator ever
/// actually waits. Nothing is spawned and the state is borrowed rather than cloned.
#[tracing::instrument(skip_all, fields(block = header.number, slot = state.beacon_slot_number))]
pub async fn compute_network_balances<S: SmoothingPoolEstimator>(
    state: &NetworkState,
    header: &BlockHeader,
    smoothing_pool: &S,
    is_atlas_deployed: bool,
) -> Result<NetworkBalances> {
    let details = &state.network_details;
    let epoch = state.beacon_epoch()?;

    let deposit_pool = if is_atlas_deployed {
        details.deposit_pool_user_balance
    } else {
        details.deposit_pool_balance
    };

    let minipools = async {
        tracing::debug!("Classifying {} minipools", state.minipool_details.len());
        Ok::<_, Error>(
            state
                .minipool_details
                .iter()
                .map(|mp| minipool_balance_details(mp, state.validator(&mp.pubkey), epoch))
                .collect::<Vec<_>>(),
        )
    };

    // Uses the off-chain calculated distributor share rather than the contract method
    let distributor_shares = async {
        Ok::<_, Error>(
            state
                .node_details
                .iter()
                .map(|node| node.distributor_balance_user_eth)
                .collect::<Vec<_>>(),
        )
    };

    let smoothing_pool_share = async {
        let interval_duration = details.interval_duration;
        if interval_duration == 0 {
            return Err(Error::InvalidState("rewards interval duration is zero".into()));
        }
        let intervals_passed =
            header.timestamp.saturating_sub(details.interval_start) / interval_duration;
        smoothing_pool
            .approximate_staker_share(SmoothingPoolRequest {
                interval_index: details.reward_index,
                start_time: details.interval_start,
                end_time: header.timestamp,
                target_slot: state.beacon_slot_number,
                header,
                intervals_passed,
                state,
            })
            .await
    };

    let (minipools, distributor_shares, smoothing_pool_share) =
        tokio::try_join!(minipools, distributor_shares, smoothing_pool_share)
            .map_err(|e| Error::AggregationFailed(Box::new(e)))?;

    let (minipools_total, minipools_staking) = sum_minipool_balances(&minipools);
    let distributor_share_total = distributor_shares
        .iter()
        .fold(U256::ZERO, |total, share| total + *share);

    let node_credit_balance = if is_atlas_deployed {
        state
            .node_details
            .iter()
            .fold(U256::ZERO, |total, node| total + node.deposit_credit_balance)
    } else {
        U256::ZERO
    };

    Ok(NetworkBalances {
        block: header.number,
        deposit_pool,
        minipools_total: unsigned("total minipool user balance", minipools_total)?,
        minipools_staking: unsigned("staking minipool user balance", minipools_staking)?,
        distributor_share_total,
        smoothing_pool_share,
        reth_contract: details.reth_balance,
        reth_supply: details.total_reth_supply,
        node_credit_balance,
    })
}

fn sum_minipool_balances(minipools: &[MinipoolBalanceDetails]) -> (I256, I256) {
    minipools
        .iter()
        .fold((I256::ZERO, I256::ZERO), |(total, staking), mp| {
            let staking = if mp.is_staking {
                staking + mp.user_balance
            } else {
                staking
            };
            (total + mp.user_balance, staking)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::eth_to_wei;

    #[test]
    fn total_backing_subtracts_node_credit() {
        let balances = NetworkBalances {
            block: 1,
            deposit_pool: eth_to_wei(10),
            minipools_total: eth_to_wei(100),
            minipools_staking: eth_to_wei(90),
            distributor_share_total: eth_to_wei(3),
            smoothing_pool_share: eth_to_wei(2),
            reth_contract: eth_to_wei(5),
            reth_supply: eth_to_wei(108),
            node_credit_balance: eth_to_wei(12),
        };
        assert_eq!(balances.total_backing(), signed(eth_to_wei(108)));
        assert_eq!(balances.implied_exchange_rate(), 1.0);
    }

    #[test]
    fn staking_sum_only_counts_staking_minipools() {
        let minipools = [
            MinipoolBalanceDetails {
                is_staking: true,
                user_balance: signed(eth_to_wei(16)),
            },
            MinipoolBalanceDetails {
                is_staking: false,
                user_balance: signed(eth_to_wei(24)),
            },
        ];
        let (total, staking) = sum_minipool_balances(&minipools);
        assert_eq!(total, signed(eth_to_wei(40)));
        assert_eq!(staking, signed(eth_to_wei(16)));
    }
}
