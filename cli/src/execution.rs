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

use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use alloy_primitives::Address;
use rocketpool_oracle_core::provider::{ExecutionClient, TwapPool};
use rocketpool_oracle_core::state::BlockHeader;
use rocketpool_oracle_core::{Error, Result};
use url::Url;

sol! {
    #[sol(rpc)]
    interface IUniswapV3PoolOracle {
        function observe(uint32[] calldata secondsAgos)
            external
            view
            returns (int56[] memory tickCumulatives, uint160[] memory secondsPerLiquidityCumulativeX128s);
    }
}

/// Execution layer JSON-RPC access
#[derive(Clone)]
pub struct ExecutionRpc {
    provider: DynProvider,
}

impl ExecutionRpc {
    pub fn new(eth_rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(eth_rpc_url).erased();
        Self { provider }
    }
}

impl ExecutionClient for ExecutionRpc {
    #[tracing::instrument(skip(self))]
    async fn header_by_number(&self, number: u64) -> Result<BlockHeader> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(|e| Error::upstream(format!("error getting header for block {number}"), e))?
            .ok_or_else(|| {
                Error::upstream(format!("error getting header for block {number}"), "not found")
            })?;

        Ok(BlockHeader {
            number: block.header.number,
            timestamp: block.header.timestamp,
        })
    }
}

impl TwapPool for ExecutionRpc {
    #[tracing::instrument(skip(self))]
    async fn observe(
        &self,
        pool: Address,
        block_number: u64,
        seconds_agos: [u32; 2],
    ) -> Result<[i64; 2]> {
        let oracle = IUniswapV3PoolOracle::new(pool, self.provider.clone());
        let observed = oracle
            .observe(seconds_agos.to_vec())
            .block(BlockId::number(block_number))
            .call()
            .await
            .map_err(|e| Error::upstream("could not get RPL price from TWAP pool", e))?;

        let ticks = observed.tickCumulatives;
        let [start, end] = ticks.as_slice() else {
            return Err(Error::upstream(
                "could not get RPL price from TWAP pool",
                format!("expected 2 tick cumulatives, got {}", ticks.len()),
            ));
        };
        let convert = |tick: &alloy_primitives::aliases::I56| {
            i64::try_from(*tick)
                .map_err(|e| Error::upstream("tick cumulative out of range", e))
        };

        Ok([convert(start)?, convert(end)?])
    }
}
